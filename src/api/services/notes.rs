//! # 笔记服务

use chrono::{DateTime, Utc};
use entity::notes;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::linfo;

/// 笔记响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<notes::Model> for NoteResponse {
    fn from(model: notes::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.map(|at| at.and_utc()),
        }
    }
}

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteSortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl NoteSortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    const fn column(self) -> notes::Column {
        match self {
            Self::CreatedAt => notes::Column::CreatedAt,
            Self::UpdatedAt => notes::Column::UpdatedAt,
            Self::Title => notes::Column::Title,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// 已校验的列表查询
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteListQuery {
    pub page: u64,
    pub limit: u64,
    pub sort_by: NoteSortField,
    pub sort_order: SortOrder,
}

impl Default for NoteListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: NoteSortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl NoteListQuery {
    /// 跳过的行数；超出 SQLite 整数范围时为 `None`
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        self.page
            .checked_sub(1)?
            .checked_mul(self.limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

/// 页码过大
pub fn page_out_of_range() -> AppError {
    AppError::bad_request("Validation failed").with_details(serde_json::json!([
        { "field": "page", "message": "Page is out of range" }
    ]))
}

/// 笔记服务
#[derive(Debug, Clone)]
pub struct NoteService {
    db: DatabaseConnection,
}

impl NoteService {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 创建笔记；标题全局唯一
    pub async fn create(&self, author_id: i64, title: &str, content: &str) -> Result<NoteResponse> {
        let txn = self.db.begin().await?;

        let existing = notes::Entity::find()
            .filter(notes::Column::Title.eq(title))
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.rollback().await?;
            return Err(duplicate_title());
        }

        let now = Utc::now().naive_utc();
        let inserted = notes::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            created_by: Set(author_id),
            created_at: Set(now),
            updated_by: Set(Some(author_id)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let note = match inserted {
            Ok(note) => note,
            Err(err) => {
                txn.rollback().await?;
                return Err(map_insert_error(err));
            }
        };
        txn.commit().await?;

        linfo!(
            "system",
            LogStage::RequestHandling,
            LogComponent::Notes,
            "note_created",
            &format!("Account {author_id} created note {}", note.id)
        );
        Ok(note.into())
    }

    /// 分页列出未删除的笔记
    pub async fn list(&self, query: NoteListQuery) -> Result<Vec<NoteResponse>> {
        let order = match query.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let offset = query.offset().ok_or_else(page_out_of_range)?;
        let notes = notes::Entity::find()
            .filter(notes::Column::DeletedAt.is_null())
            .order_by(query.sort_by.column(), order)
            .order_by(notes::Column::Id, Order::Asc)
            .offset(offset)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    /// 按 ID 获取
    pub async fn get(&self, id: Uuid) -> Result<Option<NoteResponse>> {
        Ok(notes::Entity::find_by_id(id.to_string())
            .filter(notes::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .map(NoteResponse::from))
    }
}

fn duplicate_title() -> AppError {
    AppError::conflict("Duplicate note title").with_details("A note with this title already exists")
}

// 并发创建同名笔记时由唯一约束兜底
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_title(),
        _ => err.into(),
    }
}
