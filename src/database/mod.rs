//! # 数据库模块
//!
//! 数据库连接、迁移与初始数据

mod credential_store;

pub use credential_store::SeaOrmCredentialStore;

use chrono::Utc;
use entity::{roles, user_roles, users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::auth::PasswordHasher;
use crate::auth::types::{AccountKind, ROLE_ADMIN};
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo};

/// 默认管理员用户名
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// 默认管理员密码
pub const DEFAULT_ADMIN_PASSWORD: &str = "P@ssw0rd";

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    linfo!(
        "system",
        LogStage::Database,
        LogComponent::Database,
        "connect",
        &format!("正在连接数据库: {}", config.url)
    );

    // SQLite 文件数据库需要目录和文件预先存在
    if let Some(db_file_path) = config.sqlite_file_path() {
        if let Some(parent_dir) = db_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent_dir.exists() {
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    AppError::database_with_source(
                        format!("无法创建数据库目录 {}", parent_dir.display()),
                        e,
                    )
                })?;
                ldebug!(
                    "system",
                    LogStage::Database,
                    LogComponent::Database,
                    "create_dir",
                    &format!("数据库目录创建成功: {}", parent_dir.display())
                );
            }
        }

        if !db_file_path.exists() {
            std::fs::File::create(&db_file_path).map_err(|e| {
                AppError::database_with_source(
                    format!("无法创建数据库文件 {}", db_file_path.display()),
                    e,
                )
            })?;
            ldebug!(
                "system",
                LogStage::Database,
                LogComponent::Database,
                "create_file",
                &format!("数据库文件创建成功: {}", db_file_path.display())
            );
        }
    }

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);
    // 内存库每个连接各自独立，只能使用单连接
    if config.is_memory_database() {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(config.max_connections);
    }

    let db = Database::connect(options).await?;

    linfo!(
        "system",
        LogStage::Database,
        LogComponent::Database,
        "connected",
        "数据库连接成功"
    );
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    linfo!(
        "system",
        LogStage::Database,
        LogComponent::Database,
        "migrate",
        "开始运行数据库迁移..."
    );

    ::migration::Migrator::up(db, None).await.map_err(|e| {
        lerror!(
            "system",
            LogStage::Database,
            LogComponent::Database,
            "migrate_failed",
            &format!("数据库迁移失败: {e}")
        );
        AppError::database_with_source("数据库迁移失败", e)
    })?;

    linfo!(
        "system",
        LogStage::Database,
        LogComponent::Database,
        "migrate_done",
        "数据库迁移完成"
    );
    Ok(())
}

/// 没有任何账户时创建默认管理员，返回是否创建
pub async fn ensure_default_admin(
    db: &DatabaseConnection,
    passwords: &PasswordHasher,
) -> Result<bool> {
    if users::Entity::find().count(db).await? > 0 {
        return Ok(false);
    }

    let admin_role = roles::Entity::find()
        .filter(roles::Column::Name.eq(ROLE_ADMIN))
        .one(db)
        .await?
        .ok_or_else(|| AppError::database(format!("角色 {ROLE_ADMIN} 不存在")))?;

    let password_hash = passwords.hash(DEFAULT_ADMIN_PASSWORD)?;
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;
    let admin = users::ActiveModel {
        username: Set(DEFAULT_ADMIN_USERNAME.to_string()),
        password: Set(password_hash),
        email: Set("admin@example.com".to_string()),
        firstname: Set("Admin".to_string()),
        lastname: Set(None),
        is_enabled: Set(true),
        is_account_non_expired: Set(true),
        is_account_non_locked: Set(true),
        is_credentials_non_expired: Set(true),
        is_deleted: Set(false),
        user_type: Set(AccountKind::UserAccount.to_string()),
        created_by: Set(0),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    user_roles::ActiveModel {
        user_id: Set(admin.id),
        role_id: Set(admin_role.id),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "default_admin",
        &format!("已创建默认管理员账户: {DEFAULT_ADMIN_USERNAME}")
    );
    Ok(true)
}
