// 应用配置
//
// 从环境变量（以及 .env 文件）读取配置：
// - 元数据 API 凭据（必需，缺失时整个界面进入阻塞的配置错误状态）
// - 视频搜索 API 凭据（可选，缺失时仅影响预告片回退路径）
// - 服务地址、数据库地址、防抖与超时参数

use std::time::Duration;

use url::Url;

use crate::error::{DiscoveryError, Result};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./movie_discovery.db?mode=rwc";

/// 缺少元数据凭据时展示给用户的提示
pub const MISSING_TMDB_KEY_MESSAGE: &str = "Please add your TMDB API key to the .env file";

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 元数据 API 的 Bearer 凭据
    pub tmdb_api_key: Option<String>,
    /// 视频搜索 API 凭据
    pub youtube_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub youtube_base_url: String,
    pub database_url: String,
    /// 搜索文本的静默间隔
    pub search_debounce: Duration,
    /// 单次外部请求的超时
    pub request_timeout: Duration,
    /// 模拟登录的延迟
    pub auth_latency: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            youtube_api_key: None,
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            search_debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(15),
            auth_latency: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    /// 从进程环境读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数读取配置，便于测试时不修改进程环境
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空白值视为未配置
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();

        let config = Self {
            tmdb_api_key: read("TMDB_API_KEY"),
            youtube_api_key: read("YOUTUBE_API_KEY"),
            tmdb_base_url: read("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url),
            youtube_base_url: read("YOUTUBE_BASE_URL").unwrap_or(defaults.youtube_base_url),
            database_url: read("DATABASE_URL").unwrap_or(defaults.database_url),
            search_debounce: parse_millis(read("SEARCH_DEBOUNCE_MS"), "SEARCH_DEBOUNCE_MS")?
                .unwrap_or(defaults.search_debounce),
            request_timeout: parse_secs(read("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            auth_latency: parse_millis(read("AUTH_LATENCY_MS"), "AUTH_LATENCY_MS")?
                .unwrap_or(defaults.auth_latency),
        };

        config.validate()?;
        Ok(config)
    }

    /// 校验服务地址格式
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("TMDB_BASE_URL", &self.tmdb_base_url),
            ("YOUTUBE_BASE_URL", &self.youtube_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                DiscoveryError::Configuration(format!("{} is not a valid URL ({}): {}", name, value, e))
            })?;
        }
        Ok(())
    }

    /// 获取元数据凭据，缺失时返回致命的配置错误
    pub fn require_tmdb_key(&self) -> Result<&str> {
        self.tmdb_api_key
            .as_deref()
            .ok_or(DiscoveryError::MissingApiKey)
    }

    pub fn has_youtube_key(&self) -> bool {
        self.youtube_api_key.is_some()
    }
}

fn parse_millis(value: Option<String>, name: &str) -> Result<Option<Duration>> {
    parse_number(value, name).map(|v| v.map(Duration::from_millis))
}

/// 秒数必须为正
fn parse_secs(value: Option<String>, name: &str) -> Result<Option<Duration>> {
    match parse_number(value, name)? {
        Some(0) => Err(DiscoveryError::Configuration(format!("{} must be greater than zero", name))),
        secs => Ok(secs.map(Duration::from_secs)),
    }
}

fn parse_number(value: Option<String>, name: &str) -> Result<Option<u64>> {
    value
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| {
                DiscoveryError::Configuration(format!("{} must be a non-negative integer, got '{}'", name, raw))
            })
        })
        .transpose()
}
