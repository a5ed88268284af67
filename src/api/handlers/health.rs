//! 健康检查处理器

use axum::{extract::State, response::Response};
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::api::response;
use crate::api::server::AppState;
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// 存活检查，同时探测数据库连接
pub async fn health_check(State(state): State<AppState>) -> Result<Response> {
    state
        .db
        .execute_unprepared("SELECT 1")
        .await?;

    Ok(response::success_with_message(
        HealthStatus {
            status: "ok",
            database: "connected",
        },
        "Service is healthy",
    ))
}
