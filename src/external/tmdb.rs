use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::request::MovieRequest;
use super::MovieCatalog;
use crate::config::DEFAULT_TMDB_BASE_URL;
use crate::error::{DiscoveryError, Result};
use crate::models::{CatalogVideo, MovieDetails, MoviePage, VideoList};

/// 详情接口附带的子资源
const DETAIL_APPEND: &str = "credits,videos,similar";

/// TMDB API客户端（Bearer 凭据）
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_TMDB_BASE_URL, timeout)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送 GET 请求并解析 JSON，非 2xx 状态转换为 `DiscoveryError::Http`
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("TMDB request: GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("TMDB API error: {} for {}", response.status(), url);
            return Err(DiscoveryError::from_status(response.status()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    /// 搜索、发现或榜单
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<MoviePage> {
        self.get_json(request.path(), &request.query_params()).await
    }

    /// 获取电影详情
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        let path = format!("/movie/{}", movie_id);
        self.get_json(&path, &[("append_to_response", DETAIL_APPEND.to_string())])
            .await
    }

    /// 获取视频列表
    async fn movie_videos(&self, movie_id: u64) -> Result<Vec<CatalogVideo>> {
        let path = format!("/movie/{}/videos", movie_id);
        let list: VideoList = self.get_json(&path, &[]).await?;
        Ok(list.results)
    }
}
