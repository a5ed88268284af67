//! # 用户实体定义
//!
//! 账户表的 Sea-ORM 实体模型，包含状态标志与审计字段

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,
    pub firstname: String,
    pub lastname: Option<String>,
    pub is_enabled: bool,
    pub is_account_non_expired: bool,
    pub is_account_non_locked: bool,
    pub is_credentials_non_expired: bool,
    pub is_deleted: bool,
    pub account_expiration_date: Option<DateTime>,
    pub credentials_expiration_date: Option<DateTime>,
    /// `SERVICE_ACCOUNT` 或 `USER_ACCOUNT`
    pub user_type: String,
    pub last_login: Option<DateTime>,
    pub created_by: i64,
    pub created_at: DateTime,
    pub updated_by: Option<i64>,
    pub updated_at: Option<DateTime>,
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_one = "super::refresh_tokens::Entity")]
    RefreshToken,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::refresh_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshToken.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_roles::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_roles::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
