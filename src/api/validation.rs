//! # 请求参数校验
//!
//! 请求结构体通过 `validator` 派生声明规则，这里把 `ValidationErrors`
//! 转换为带字段详情的 `BadRequest`。

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::error::AppError;

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field);
                errs.iter()
                    .map(move |err| FieldError {
                        message: render_message(&field, err),
                        field: field.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        // HashMap 迭代无序，按字段名排序保证输出稳定
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        let details = serde_json::to_value(&fields).unwrap_or_default();
        Self::bad_request("Validation failed").with_details(details)
    }
}

// 显式 message 优先；长度规则按实际越界方向生成消息
fn render_message(field: &str, err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }

    let label = label(field);
    if err.code == "length" {
        let len = err
            .params
            .get("value")
            .and_then(|v| v.as_str())
            .map_or(0, |v| v.chars().count() as u64);
        let min = err.params.get("min").and_then(serde_json::Value::as_u64);
        let max = err.params.get("max").and_then(serde_json::Value::as_u64);

        match (min, max) {
            (Some(min), _) if len < min && min <= 1 => return format!("{label} is required"),
            (Some(min), _) if len < min => {
                return format!("{label} must be at least {min} characters long");
            }
            (_, Some(max)) if len > max => {
                return format!("{label} must not exceed {max} characters");
            }
            _ => {}
        }
    }
    format!("{label} is invalid")
}

// refresh_token -> refreshToken
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// refreshToken -> "Refresh token"
fn label(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 3, max = 20))]
        username: String,
        #[validate(length(min = 1, max = 150))]
        title: String,
        #[validate(length(min = 1, max = 10))]
        content: String,
        #[validate(length(min = 1, max = 500))]
        refresh_token: String,
        #[validate(range(min = 1, message = "Page must be at least 1"))]
        page: Option<i64>,
    }

    fn valid() -> Sample {
        Sample {
            username: "admin".into(),
            title: "t".into(),
            content: "c".into(),
            refresh_token: "r".into(),
            page: None,
        }
    }

    #[test]
    fn test_length_messages() {
        let sample = Sample {
            username: "ab".into(),
            title: String::new(),
            content: "x".repeat(11),
            refresh_token: String::new(),
            page: Some(0),
        };

        let err = AppError::from(sample.validate().unwrap_err());
        assert_eq!(err.message(), "Validation failed");
        assert_eq!(
            err.details().cloned().unwrap(),
            json!([
                { "field": "content", "message": "Content must not exceed 10 characters" },
                { "field": "page", "message": "Page must be at least 1" },
                { "field": "refreshToken", "message": "Refresh token is required" },
                { "field": "title", "message": "Title is required" },
                { "field": "username", "message": "Username must be at least 3 characters long" }
            ])
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let sample = Sample {
            content: "笔记内容笔记内容笔记".into(),
            ..valid()
        };
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid().validate().is_ok());
    }
}
