//! # 路由配置

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use super::handlers::{auth, health, notes};
use super::middleware::auth_gate;
use super::server::AppState;

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api/notes", note_routes(state.clone()))
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// 登录与刷新，无需认证
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh-token", post(auth::refresh_token))
}

/// 笔记路由，全部经过认证中间件
fn note_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(notes::create_note).get(notes::list_notes))
        .route("/{id}", get(notes::get_note))
        .route_layer(from_fn_with_state(state, auth_gate))
}
