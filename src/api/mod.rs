//! # HTTP API 模块
//!
//! 路由、认证中间件、请求处理器与统一响应格式

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

pub use routes::create_routes;
pub use server::{ApiServer, AppState, build_router};
