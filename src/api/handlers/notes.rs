//! # 笔记处理器

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::middleware::AuthenticatedUser;
use crate::api::response;
use crate::api::server::AppState;
use crate::api::services::notes::page_out_of_range;
use crate::api::services::{NoteListQuery, NoteSortField, SortOrder};
use crate::error::{AppError, Result};

/// 创建笔记请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// 列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesParams {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(custom(function = "validate_sort_by"))]
    pub sort_by: Option<String>,
    #[validate(custom(function = "validate_sort_order"))]
    pub sort_order: Option<String>,
}

fn validate_sort_by(raw: &str) -> std::result::Result<(), ValidationError> {
    NoteSortField::parse(raw).map(|_| ()).ok_or_else(|| {
        let mut err = ValidationError::new("sort_by");
        err.message = Some("sortBy must be one of createdAt, updatedAt, title".into());
        err
    })
}

fn validate_sort_order(raw: &str) -> std::result::Result<(), ValidationError> {
    SortOrder::parse(raw).map(|_| ()).ok_or_else(|| {
        let mut err = ValidationError::new("sort_order");
        err.message = Some("sortOrder must be asc or desc".into());
        err
    })
}

impl ListNotesParams {
    /// 校验并补全默认值
    pub fn into_query(self) -> Result<NoteListQuery> {
        self.validate()?;

        let defaults = NoteListQuery::default();
        let query = NoteListQuery {
            page: self.page.map_or(defaults.page, i64::unsigned_abs),
            limit: self.limit.map_or(defaults.limit, i64::unsigned_abs),
            sort_by: self
                .sort_by
                .as_deref()
                .and_then(NoteSortField::parse)
                .unwrap_or(defaults.sort_by),
            sort_order: self
                .sort_order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or(defaults.sort_order),
        };
        if query.offset().is_none() {
            return Err(page_out_of_range());
        }
        Ok(query)
    }
}

/// 创建笔记
pub async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    request.validate()?;

    let note = state
        .notes
        .create(user.id(), &request.title, &request.content)
        .await?;
    Ok(response::created(note, "Note created successfully"))
}

/// 笔记列表
pub async fn list_notes(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    params: std::result::Result<Query<ListNotesParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params?;
    let notes = state.notes.list(params.into_query()?).await?;
    if notes.is_empty() {
        return Err(crate::not_found!("No notes found")
            .with_details("There are no notes available at the moment."));
    }

    Ok(response::success_with_message(notes, "Notes fetched successfully"))
}

/// 获取单个笔记
pub async fn get_note(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let note_id = Uuid::parse_str(&id).map_err(|_| {
        AppError::bad_request("Invalid note ID format").with_details("Note ID must be a valid UUID")
    })?;

    let note = state.notes.get(note_id).await?.ok_or_else(|| {
        AppError::not_found("Note not found").with_details(format!("No note found with ID {id}"))
    })?;
    Ok(response::success_with_message(note, "Note fetched successfully"))
}
