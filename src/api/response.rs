//! # API 响应结构
//!
//! 成功响应统一为 `{ success, message, data, timestamp }`，
//! 错误响应统一为 `{ name, message, details? }`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, ErrorCategory};
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, lwarn};

/// # 标准成功响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

/// # 标准错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// # API响应
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    message: String,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(SuccessResponse {
                success: true,
                message: self.message,
                data: self.data,
                timestamp: Utc::now(),
            }),
        )
            .into_response()
    }
}

/// # 便捷函数：带消息的成功响应
pub fn success_with_message<T: Serialize>(data: T, message: &str) -> Response {
    ApiResponse::ok(data, message).into_response()
}

/// # 便捷函数：201 创建成功响应
pub fn created<T: Serialize>(data: T, message: &str) -> Response {
    ApiResponse::created(data, message).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 服务端错误不向调用方暴露内部原因
        let message = match &self {
            Self::Config { .. } => "Server configuration error".to_string(),
            Self::Database { .. } => "Database error".to_string(),
            _ => self.message().to_string(),
        };

        match self.category() {
            ErrorCategory::Server => lerror!(
                "system",
                LogStage::RequestHandling,
                LogComponent::ServerSetup,
                "server_error",
                &format!("{self:?}")
            ),
            ErrorCategory::Client => lwarn!(
                "system",
                LogStage::RequestHandling,
                LogComponent::ServerSetup,
                "client_error",
                &format!("{} {}", self.kind(), self.message())
            ),
        }

        let body = ErrorResponse {
            name: self.kind().to_string(),
            message,
            details: self.details().cloned(),
        };
        (status, Json(body)).into_response()
    }
}
