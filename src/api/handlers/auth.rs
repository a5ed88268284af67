//! # 认证处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::response;
use crate::api::server::AppState;
use crate::error::Result;

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[validate(length(min = 6, max = 150))]
    pub password: String,
}

/// 刷新令牌请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 500))]
    pub refresh_token: String,
}

/// 用户登录
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    request.validate()?;

    let token = state.auth.login(&request.username, &request.password).await?;
    Ok(response::success_with_message(token, "Login successful"))
}

/// 刷新令牌
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    request.validate()?;

    let token = state.auth.exchange_refresh_token(&request.refresh_token).await?;
    Ok(response::success_with_message(token, "Refresh token successful"))
}
