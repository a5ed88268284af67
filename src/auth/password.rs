//! # 密码哈希
//!
//! bcrypt 计算开销大，校验放在阻塞线程池中执行

use crate::config::DEFAULT_BCRYPT_COST;
use crate::error::{AppError, Result};

/// bcrypt 密码处理器
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// 生成密码哈希
    pub fn hash(&self, plain: &str) -> Result<String> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    /// 校验明文密码与哈希是否匹配
    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| AppError::internal_with_source("密码校验任务失败", e))?
            .map_err(AppError::from)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
