//! # 基于 Sea-ORM 的凭据存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entity::{refresh_tokens, roles, users};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::auth::store::{Account, CredentialStore, RefreshTokenRecord};
use crate::error::{AppError, Result};

/// 数据库凭据存储
#[derive(Debug, Clone)]
pub struct SeaOrmCredentialStore {
    db: DatabaseConnection,
}

impl SeaOrmCredentialStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // 账户查询排除软删除行，并带出角色名
    async fn load_account(
        tx: &DatabaseTransaction,
        condition: impl sea_orm::sea_query::IntoCondition,
    ) -> Result<Option<Account>> {
        let Some(user) = users::Entity::find()
            .filter(condition)
            .filter(users::Column::DeletedAt.is_null())
            .one(tx)
            .await?
        else {
            return Ok(None);
        };

        let roles = user
            .find_related(roles::Entity)
            .all(tx)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect();

        to_account(user, roles).map(Some)
    }
}

fn to_account(user: users::Model, roles: Vec<String>) -> Result<Account> {
    let account_kind = user
        .user_type
        .parse()
        .map_err(|e: String| AppError::database(format!("用户 {} 数据异常: {e}", user.id)))?;

    Ok(Account {
        id: user.id,
        username: user.username,
        password_hash: user.password,
        email: user.email,
        firstname: user.firstname,
        lastname: user.lastname,
        is_enabled: user.is_enabled,
        is_account_non_expired: user.is_account_non_expired,
        is_account_non_locked: user.is_account_non_locked,
        is_credentials_non_expired: user.is_credentials_non_expired,
        is_deleted: user.is_deleted,
        account_kind,
        last_login: user.last_login.map(|at| at.and_utc()),
        roles,
    })
}

fn to_record(model: refresh_tokens::Model) -> RefreshTokenRecord {
    RefreshTokenRecord {
        token: model.token,
        account_id: model.user_id,
        expires_at: model.expires_at.and_utc(),
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    type Tx = DatabaseTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        Ok(self.db.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        Ok(tx.commit().await?)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        Ok(tx.rollback().await?)
    }

    async fn find_account_by_username(
        &self,
        tx: &mut Self::Tx,
        username: &str,
    ) -> Result<Option<Account>> {
        Self::load_account(tx, users::Column::Username.eq(username)).await
    }

    async fn find_account_by_id(&self, tx: &mut Self::Tx, id: i64) -> Result<Option<Account>> {
        Self::load_account(tx, users::Column::Id.eq(id)).await
    }

    async fn update_last_login(
        &self,
        tx: &mut Self::Tx,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::LastLogin, Expr::value(at.naive_utc()))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::DeletedAt.is_null())
            .exec(&*tx)
            .await?;
        Ok(result.rows_affected)
    }

    async fn find_refresh_token_by_account(
        &self,
        tx: &mut Self::Tx,
        account_id: i64,
    ) -> Result<Option<RefreshTokenRecord>> {
        Ok(refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::UserId.eq(account_id))
            .one(&*tx)
            .await?
            .map(to_record))
    }

    async fn find_refresh_token(
        &self,
        tx: &mut Self::Tx,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>> {
        Ok(refresh_tokens::Entity::find_by_id(token.to_string())
            .one(&*tx)
            .await?
            .map(to_record))
    }

    async fn delete_refresh_token(&self, tx: &mut Self::Tx, token: &str) -> Result<u64> {
        let result = refresh_tokens::Entity::delete_by_id(token.to_string())
            .exec(&*tx)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_refresh_token(
        &self,
        tx: &mut Self::Tx,
        record: &RefreshTokenRecord,
    ) -> Result<()> {
        let model = refresh_tokens::ActiveModel {
            token: Set(record.token.clone()),
            user_id: Set(record.account_id),
            expires_at: Set(record.expires_at.naive_utc()),
        };
        refresh_tokens::Entity::insert(model)
            .exec_without_returning(&*tx)
            .await?;
        Ok(())
    }

    async fn delete_expired_refresh_tokens(
        &self,
        tx: &mut Self::Tx,
        before: DateTime<Utc>,
    ) -> Result<u64> {
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::ExpiresAt.lt(before.naive_utc()))
            .exec(&*tx)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::{init_database, run_migrations};
    use chrono::Duration;
    use entity::user_roles;
    use sea_orm::ActiveModelTrait;

    async fn setup() -> (DatabaseConnection, SeaOrmCredentialStore) {
        let db = init_database(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&db).await.unwrap();
        let store = SeaOrmCredentialStore::new(db.clone());
        (db, store)
    }

    async fn insert_user(db: &DatabaseConnection, username: &str, role_ids: &[i32]) -> i64 {
        let user = users::ActiveModel {
            username: Set(username.to_string()),
            password: Set("hash".to_string()),
            email: Set(format!("{username}@example.com")),
            firstname: Set("Test".to_string()),
            is_enabled: Set(true),
            is_account_non_expired: Set(true),
            is_account_non_locked: Set(true),
            is_credentials_non_expired: Set(true),
            is_deleted: Set(false),
            user_type: Set("USER_ACCOUNT".to_string()),
            created_by: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        for role_id in role_ids {
            user_roles::ActiveModel {
                user_id: Set(user.id),
                role_id: Set(*role_id),
            }
            .insert(db)
            .await
            .unwrap();
        }
        user.id
    }

    #[tokio::test]
    async fn test_find_account_with_roles() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "alice", &[1, 3]).await;

        let mut tx = store.begin().await.unwrap();
        let account = store
            .find_account_by_username(&mut tx, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.id, id);
        let mut roles = account.roles.clone();
        roles.sort();
        assert_eq!(roles, vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()]);

        let by_id = store.find_account_by_id(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(by_id, account);
        assert!(store.find_account_by_username(&mut tx, "bob").await.unwrap().is_none());
        store.commit(tx).await.unwrap();
    }

    #[tokio::test]
    async fn test_soft_deleted_account_is_hidden() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "gone", &[]).await;
        users::Entity::update_many()
            .col_expr(users::Column::DeletedAt, Expr::value(Utc::now().naive_utc()))
            .filter(users::Column::Id.eq(id))
            .exec(&db)
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(store.find_account_by_username(&mut tx, "gone").await.unwrap().is_none());
        assert_eq!(store.update_last_login(&mut tx, id, Utc::now()).await.unwrap(), 0);
        store.rollback(tx).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "carol", &[]).await;
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(store.update_last_login(&mut tx, id, at).await.unwrap(), 1);
        store.commit(tx).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let account = store.find_account_by_id(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(account.last_login, Some(at));
        store.rollback(tx).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_token_crud_and_purge() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "dave", &[]).await;
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        let record = RefreshTokenRecord {
            token: "11111111-1111-4111-8111-111111111111".to_string(),
            account_id: id,
            expires_at: now - Duration::hours(1),
        };

        let mut tx = store.begin().await.unwrap();
        store.insert_refresh_token(&mut tx, &record).await.unwrap();
        assert_eq!(
            store.find_refresh_token(&mut tx, &record.token).await.unwrap(),
            Some(record.clone())
        );
        assert_eq!(
            store.find_refresh_token_by_account(&mut tx, id).await.unwrap(),
            Some(record.clone())
        );
        assert_eq!(store.delete_expired_refresh_tokens(&mut tx, now).await.unwrap(), 1);
        assert_eq!(store.delete_refresh_token(&mut tx, &record.token).await.unwrap(), 0);
        store.commit(tx).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_token_for_account_violates_unique() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "erin", &[]).await;
        let expires_at = Utc::now() + Duration::hours(1);

        let mut tx = store.begin().await.unwrap();
        for (i, token) in ["first", "second"].into_iter().enumerate() {
            let result = store
                .insert_refresh_token(
                    &mut tx,
                    &RefreshTokenRecord {
                        token: token.to_string(),
                        account_id: id,
                        expires_at,
                    },
                )
                .await;
            assert_eq!(result.is_ok(), i == 0);
        }
        store.rollback(tx).await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_discards_insert() {
        let (db, store) = setup().await;
        let id = insert_user(&db, "frank", &[]).await;

        let mut tx = store.begin().await.unwrap();
        store
            .insert_refresh_token(
                &mut tx,
                &RefreshTokenRecord {
                    token: "discarded".to_string(),
                    account_id: id,
                    expires_at: Utc::now() + Duration::hours(1),
                },
            )
            .await
            .unwrap();
        store.rollback(tx).await.unwrap();

        assert!(refresh_tokens::Entity::find().one(&db).await.unwrap().is_none());
    }
}
