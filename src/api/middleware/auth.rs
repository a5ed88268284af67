//! # 认证中间件
//!
//! 从请求头中提取 Bearer 令牌，验证后将会话声明注入到请求扩展中。

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::api::server::AppState;
use crate::auth::SessionClaims;
use crate::error::AppError;
use crate::logging::{LogComponent, LogStage, sanitize_token};
use crate::{ldebug, lwarn};

/// 已认证用户，由认证中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionClaims);

impl AuthenticatedUser {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0.payload.id
    }

    #[must_use]
    pub const fn claims(&self) -> &SessionClaims {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::unauthorized("User not authenticated")
                .with_details("You must be logged in to access this resource")
        })
    }
}

/// 提取 `Authorization: Bearer <token>` 中的令牌
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::unauthorized("Missing or invalid Authorization header")
                .with_details("Authorization header must start with 'Bearer '")
        })?;

    let token = value.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Missing or invalid token")
            .with_details("Token must be provided in the Authorization header"));
    }
    Ok(token)
}

/// Axum认证中间件
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = state.jwt.verify(token).map_err(|e| {
        lwarn!(
            "system",
            LogStage::Authentication,
            LogComponent::AuthGate,
            "token_rejected",
            &format!("Rejected bearer token {}: {e}", sanitize_token(token))
        );
        AppError::from(e)
    })?;

    ldebug!(
        "system",
        LogStage::Authentication,
        LogComponent::AuthGate,
        "token_accepted",
        &format!("Authenticated account {}", claims.account_id())
    );
    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
