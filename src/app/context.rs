//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入替身实现。

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::services::NoteService;
use crate::auth::{AuthSessionService, JwtManager, PasswordHasher, RefreshTokenManager};
use crate::config::AppConfig;
use crate::database::SeaOrmCredentialStore;
use crate::error::Result;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtManager>,
    pub auth: Arc<AuthSessionService<SeaOrmCredentialStore>>,
    pub notes: NoteService,
}

impl AppContext {
    /// 由配置和已迁移的数据库连接构建；签名配置无效时立即失败
    pub fn build(config: AppConfig, db: DatabaseConnection) -> Result<Self> {
        let jwt = Arc::new(JwtManager::new(&config.jwt)?);
        let auth = AuthSessionService::new(
            SeaOrmCredentialStore::new(db.clone()),
            Arc::clone(&jwt),
            RefreshTokenManager::new(config.refresh_token.expiration_hours.clone()),
            PasswordHasher::new(config.password.bcrypt_cost),
        )
        .with_recheck_on_refresh(config.refresh_token.recheck_account_on_refresh);

        Ok(Self {
            notes: NoteService::new(db.clone()),
            config: Arc::new(config),
            db,
            jwt,
            auth: Arc::new(auth),
        })
    }

    #[must_use]
    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.config.password.bcrypt_cost)
    }
}
