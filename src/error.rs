// 错误类型定义
//
// 定义了发现界面核心中可能出现的各种错误类型：
// - 配置错误（缺少凭据，启动即失败或仅影响某个子功能）
// - 传输错误（非 2xx 状态码、网络失败、超时、响应解析失败）
// - 存储错误（SQLite 键值存储、搜索统计）
// - 认证错误（本地模拟登录表单校验）

use std::time::Duration;
use thiserror::Error;

/// 统一错误类型
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 缺少元数据服务凭据，启动即失败
    #[error("configuration error: {}", crate::config::MISSING_TMDB_KEY_MESSAGE)]
    MissingApiKey,

    /// 非 2xx 响应，`reason` 为状态码的标准短语
    #[error("{status} {reason}")]
    Http { status: u16, reason: String },

    #[error("{0}")]
    Network(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Auth(String),
}

impl DiscoveryError {
    /// 是否属于传输层错误（可重试）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Http { .. }
                | DiscoveryError::Network(_)
                | DiscoveryError::Timeout(_)
                | DiscoveryError::Decode(_)
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DiscoveryError::Configuration(_) | DiscoveryError::MissingApiKey)
    }

    /// 由 HTTP 状态码构造错误
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        DiscoveryError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

// 实现从 reqwest::Error 到 DiscoveryError 的转换
impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            match err.status() {
                Some(status) => DiscoveryError::from_status(status),
                None => DiscoveryError::Network(err.to_string()),
            }
        } else if err.is_decode() {
            DiscoveryError::Decode(err.to_string())
        } else {
            DiscoveryError::Network(err.to_string())
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DiscoveryError>;
