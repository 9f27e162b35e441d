// 键值存储与会话存储
//
// - KeyValueStore: 最小的 get/set/remove 持久化接口
// - SqliteKeyValueStore: 基于 user_settings 表的实现
// - MemoryKeyValueStore: 内存实现（测试、无持久化场景）
// - SessionStore: 在固定键 "user" 上读写 JSON 编码的当前用户

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::SessionUser;

/// 当前用户记录使用的键
pub const USER_KEY: &str = "user";

/// 键值持久化接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite 键值存储
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Pool<Sqlite>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM user_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO user_settings (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// 内存键值存储
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// 会话存储：在单个键上保存当前用户
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取已保存的用户
    ///
    /// 记录损坏时删除该键并返回 None
    pub async fn load(&self) -> Result<Option<SessionUser>> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::error!("Error parsing saved user: {}", e);
                self.store.remove(USER_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, user: &SessionUser) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &json).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(USER_KEY).await
    }
}
