//! # HTTP 服务器
//!
//! Axum HTTP服务器，承载认证与笔记 API

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::context::AppContext;
use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    #[must_use]
    pub const fn context_arc(&self) -> &Arc<AppContext> {
        &self.context
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 构建完整路由（含 CORS 与请求追踪）
pub fn build_router(context: Arc<AppContext>) -> Router {
    let cors = cors_layer(&context.config.server.cors_origins);
    super::routes::create_routes(AppState::new(context)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    match origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        Ok(origins) => layer.allow_origin(origins),
        Err(e) => {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::ServerSetup,
                "cors_config_fail",
                &format!("Invalid CORS origin configuration: {e}, falling back to allow any")
            );
            layer.allow_origin(Any)
        }
    }
}

/// API 服务器
pub struct ApiServer {
    addr: SocketAddr,
    router: Router,
}

impl ApiServer {
    pub fn new(config: &ServerConfig, context: Arc<AppContext>) -> Result<Self> {
        let ip = config.host.parse::<std::net::IpAddr>().map_err(|e| {
            AppError::config(format!("Invalid bind address '{}': {e}", config.host))
        })?;

        Ok(Self {
            addr: SocketAddr::new(ip, config.port),
            router: build_router(context),
        })
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 启动服务器
    pub async fn serve(self) -> Result<()> {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "server_start",
            &format!("Starting HTTP server on {}", self.addr)
        );

        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.router)
            .await
            .map_err(|e| AppError::internal_with_source("HTTP server error", e))
    }
}

