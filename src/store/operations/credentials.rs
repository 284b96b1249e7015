use std::sync::Arc;

use crate::api::models::user::User;
use crate::error::CoreError;
use crate::store::{CredentialStore, keys};

/// 凭证存储操作
pub struct CredentialOperations;

impl CredentialOperations {
    /// 读取访问令牌
    pub fn token(store: &Arc<dyn CredentialStore>) -> Result<Option<String>, CoreError> {
        store.get(keys::AUTH_TOKEN)
    }

    /// 登录成功后写入令牌和用户信息
    pub fn store_login(
        store: &Arc<dyn CredentialStore>,
        token: &str,
        user: &User,
    ) -> Result<(), CoreError> {
        store.set(keys::AUTH_TOKEN, token)?;
        Self::store_user(store, user)
    }

    /// 缓存用户信息
    pub fn store_user(store: &Arc<dyn CredentialStore>, user: &User) -> Result<(), CoreError> {
        let json = serde_json::to_string(user)?;
        store.set(keys::CACHED_USER, &json)
    }

    /// 读取缓存的用户信息，解析失败按缺失处理
    pub fn cached_user(store: &Arc<dyn CredentialStore>) -> Result<Option<User>, CoreError> {
        match store.get(keys::CACHED_USER)? {
            Some(json) => Ok(serde_json::from_str(&json).ok()),
            None => Ok(None),
        }
    }

    /// 登出或令牌过期时清空本地凭证
    pub fn clear(store: &Arc<dyn CredentialStore>) -> Result<(), CoreError> {
        store.clear()
    }
}
