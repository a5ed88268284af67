//! # 刷新令牌实体定义
//!
//! 每个用户至多一条有效记录（`user_id` 唯一）

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 刷新令牌实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    /// UUID 文本格式的不透明令牌值
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub expires_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
