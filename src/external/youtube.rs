use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::VideoSearch;
use crate::config::DEFAULT_YOUTUBE_BASE_URL;
use crate::error::{DiscoveryError, Result};
use crate::models::{TrailerCandidate, TrailerSource};

/// 单次搜索返回的最大条数
pub const MAX_RESULTS: u8 = 5;

/// YouTube Data API 客户端
#[derive(Clone)]
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_YOUTUBE_BASE_URL, timeout)
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
}

#[async_trait]
impl VideoSearch for YoutubeClient {
    async fn search_videos(&self, query: &str) -> Result<Vec<TrailerCandidate>> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("YouTube search: {}", query);
        let max_results = MAX_RESULTS.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("videoCategoryId", "1"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::from_status(response.status()));
        }

        let body: YoutubeSearchResponse = response.json().await?;
        Ok(body.into_candidates())
    }
}

/// 搜索响应体
#[derive(Debug, Default, Deserialize)]
pub struct YoutubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YoutubeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeSearchItem {
    pub id: YoutubeItemId,
    pub snippet: YoutubeSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnails: YoutubeThumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub struct YoutubeThumbnails {
    #[serde(default)]
    pub high: Option<YoutubeThumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeThumbnail {
    pub url: String,
}

impl YoutubeSearchResponse {
    /// 转换为预告片候选项，跳过没有视频 ID 的条目（频道、播放列表）
    pub fn into_candidates(self) -> Vec<TrailerCandidate> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                Some(TrailerCandidate {
                    id,
                    title: item.snippet.title,
                    source: TrailerSource::VideoSearch,
                    thumbnail_url: item
                        .snippet
                        .thumbnails
                        .high
                        .map(|thumb| thumb.url)
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}
