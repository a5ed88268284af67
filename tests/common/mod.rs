//! # 集成测试公共工具
//!
//! 内存数据库 + 完整路由的测试应用，以及账户 fixture

#![allow(dead_code)]

use axum::http::{HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use entity::{refresh_tokens, roles, user_roles, users};
use notes_backend::api::build_router;
use notes_backend::app::AppContext;
use notes_backend::auth::PasswordHasher;
use notes_backend::config::{AppConfig, DatabaseConfig, JwtConfig, PasswordConfig};
use notes_backend::server_setup;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

pub const PASSWORD: &str = "P@ssw0rd";

/// 测试配置：内存库、低 bcrypt 代价、关闭清理任务
pub fn test_config(algorithm: &str) -> AppConfig {
    let mut config = AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        },
        jwt: JwtConfig {
            algorithm: algorithm.to_string(),
            expires_in: "15m".to_string(),
            secret: Some("integration-test-secret".to_string()),
            private_key_path: fixture_path("keys/private.pem"),
            public_key_path: fixture_path("keys/public.pem"),
        },
        password: PasswordConfig { bcrypt_cost: 4 },
        ..Default::default()
    };
    config.refresh_token.cleanup_interval_seconds = 0;
    config
}

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

/// 测试应用
pub struct TestApp {
    pub server: TestServer,
    pub context: Arc<AppContext>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_config(test_config("HS256")).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let context = server_setup::bootstrap(config)
            .await
            .expect("bootstrap test app");
        let server = TestServer::new(build_router(Arc::clone(&context)))
            .expect("failed to create test server");
        Self { server, context }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.context.db
    }

    pub async fn login(&self, username: &str, password: &str) -> axum_test::TestResponse {
        self.server
            .post("/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    /// 登录并返回响应中的 `data`
    pub async fn login_ok(&self, username: &str, password: &str) -> Value {
        let response = self.login(username, password).await;
        response.assert_status_ok();
        response.json::<Value>()["data"].clone()
    }

    pub async fn refresh(&self, refresh_token: &str) -> axum_test::TestResponse {
        self.server
            .post("/auth/refresh-token")
            .json(&json!({ "refreshToken": refresh_token }))
            .await
    }

    pub async fn admin_token(&self) -> String {
        let data = self.login_ok("admin", PASSWORD).await;
        data["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn refresh_token_count(&self, user_id: i64) -> u64 {
        refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .count(self.db())
            .await
            .unwrap()
    }
}

pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

/// 账户测试数据构建器
pub struct UserFixture {
    pub username: String,
    pub password: String,
    pub is_enabled: bool,
    pub is_account_non_expired: bool,
    pub is_account_non_locked: bool,
    pub is_credentials_non_expired: bool,
    pub is_deleted: bool,
    pub roles: Vec<&'static str>,
}

impl UserFixture {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            is_enabled: true,
            is_account_non_expired: true,
            is_account_non_locked: true,
            is_credentials_non_expired: true,
            is_deleted: false,
            roles: vec!["ROLE_USER"],
        }
    }

    pub fn roles(mut self, roles: &[&'static str]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }

    pub fn account_expired(mut self) -> Self {
        self.is_account_non_expired = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_account_non_locked = false;
        self
    }

    pub fn credentials_expired(mut self) -> Self {
        self.is_credentials_non_expired = false;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// 写入数据库，返回账户 ID
    pub async fn insert(self, db: &DatabaseConnection) -> i64 {
        let password = PasswordHasher::new(4).hash(&self.password).unwrap();
        let user = users::ActiveModel {
            username: Set(self.username.clone()),
            password: Set(password),
            email: Set(format!("{}@example.com", self.username)),
            firstname: Set("Test".to_string()),
            lastname: Set(Some("User".to_string())),
            is_enabled: Set(self.is_enabled),
            is_account_non_expired: Set(self.is_account_non_expired),
            is_account_non_locked: Set(self.is_account_non_locked),
            is_credentials_non_expired: Set(self.is_credentials_non_expired),
            is_deleted: Set(self.is_deleted),
            user_type: Set("USER_ACCOUNT".to_string()),
            created_by: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        for name in self.roles {
            let role = roles::Entity::find()
                .filter(roles::Column::Name.eq(name))
                .one(db)
                .await
                .unwrap()
                .unwrap();
            user_roles::ActiveModel {
                user_id: Set(user.id),
                role_id: Set(role.id),
            }
            .insert(db)
            .await
            .unwrap();
        }
        user.id
    }
}
