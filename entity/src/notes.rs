//! # 笔记实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 笔记实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_by: i64,
    pub created_at: DateTime,
    pub updated_by: Option<i64>,
    pub updated_at: Option<DateTime>,
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
