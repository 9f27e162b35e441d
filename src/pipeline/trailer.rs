// 预告片查找
//
// 按顺序尝试各个来源，第一个给出非空结果的来源胜出：
// 1. 元数据目录的视频列表（仅 YouTube 上的 Trailer），失败视为无匹配
// 2. 视频搜索接口，缺少凭据或调用失败时给出明确的不可用原因

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use super::bounded;
use super::lookup::{LookupSlot, SlotOutcome};
use crate::external::{MovieCatalog, VideoSearch};
use crate::models::{CatalogVideo, MovieSummary, TrailerCandidate};

/// 预告片不可用的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerUnavailable {
    /// 视频搜索凭据缺失
    NotConfigured,
    /// 视频搜索调用失败
    SourceFailed,
}

impl TrailerUnavailable {
    pub fn message(&self) -> &'static str {
        match self {
            TrailerUnavailable::NotConfigured => {
                "YouTube API key not configured. Please add YOUTUBE_API_KEY to your environment variables."
            }
            TrailerUnavailable::SourceFailed => "Unable to load trailers. Please try again later.",
        }
    }
}

/// 单个来源的查找结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Found(Vec<TrailerCandidate>),
    NoMatch,
    Unavailable(TrailerUnavailable),
}

/// 预告片来源
#[async_trait]
pub trait TrailerProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find_trailers(&self, movie: &MovieSummary) -> ProviderOutcome;
}

/// 元数据目录的视频列表
pub struct CatalogTrailerProvider {
    catalog: Arc<dyn MovieCatalog>,
    request_timeout: Duration,
}

impl CatalogTrailerProvider {
    pub fn new(catalog: Arc<dyn MovieCatalog>, request_timeout: Duration) -> Self {
        Self {
            catalog,
            request_timeout,
        }
    }
}

#[async_trait]
impl TrailerProvider for CatalogTrailerProvider {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn find_trailers(&self, movie: &MovieSummary) -> ProviderOutcome {
        let videos = match bounded(self.request_timeout, self.catalog.movie_videos(movie.id)).await {
            Ok(videos) => videos,
            Err(e) => {
                tracing::warn!("Error fetching videos for movie {}: {}", movie.id, e);
                return ProviderOutcome::NoMatch;
            }
        };

        let trailers: Vec<TrailerCandidate> = videos
            .iter()
            .filter(|video| video.is_trailer())
            .map(CatalogVideo::to_candidate)
            .collect();

        if trailers.is_empty() {
            ProviderOutcome::NoMatch
        } else {
            ProviderOutcome::Found(trailers)
        }
    }
}

/// 视频搜索回退来源，`search` 为 None 表示未配置凭据
pub struct VideoSearchTrailerProvider {
    search: Option<Arc<dyn VideoSearch>>,
    request_timeout: Duration,
}

impl VideoSearchTrailerProvider {
    pub fn new(search: Option<Arc<dyn VideoSearch>>, request_timeout: Duration) -> Self {
        Self {
            search,
            request_timeout,
        }
    }
}

#[async_trait]
impl TrailerProvider for VideoSearchTrailerProvider {
    fn name(&self) -> &'static str {
        "video_search"
    }

    async fn find_trailers(&self, movie: &MovieSummary) -> ProviderOutcome {
        let Some(search) = &self.search else {
            tracing::warn!("YouTube API key not configured, skipping trailer search");
            return ProviderOutcome::Unavailable(TrailerUnavailable::NotConfigured);
        };

        let query = trailer_search_query(movie);
        match bounded(self.request_timeout, search.search_videos(&query)).await {
            Ok(trailers) if trailers.is_empty() => ProviderOutcome::NoMatch,
            Ok(trailers) => ProviderOutcome::Found(trailers),
            Err(e) => {
                tracing::warn!("Error searching trailers for '{}': {}", query, e);
                ProviderOutcome::Unavailable(TrailerUnavailable::SourceFailed)
            }
        }
    }
}

/// 回退搜索的关键词："<标题> <年份> official trailer"，缺失部分不留多余空格
pub fn trailer_search_query(movie: &MovieSummary) -> String {
    let year = movie.release_year().map(|year| year.to_string());
    [Some(movie.title.trim()), year.as_deref(), Some("official trailer")]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 有序的来源链
pub struct TrailerChain {
    providers: Vec<Arc<dyn TrailerProvider>>,
}

impl TrailerChain {
    pub fn new(providers: Vec<Arc<dyn TrailerProvider>>) -> Self {
        Self { providers }
    }

    /// 依次尝试来源，遇到非空结果立即返回
    ///
    /// 全部无匹配时返回 NoMatch；最后一个给出不可用原因的来源决定错误类型
    pub async fn resolve(&self, movie: &MovieSummary) -> ProviderOutcome {
        let mut outcome = ProviderOutcome::NoMatch;
        for provider in &self.providers {
            match provider.find_trailers(movie).await {
                ProviderOutcome::Found(trailers) => {
                    tracing::debug!(
                        "Found {} trailers for movie {} via {}",
                        trailers.len(),
                        movie.id,
                        provider.name()
                    );
                    return ProviderOutcome::Found(trailers);
                }
                ProviderOutcome::NoMatch => {
                    tracing::debug!("No trailers for movie {} via {}", movie.id, provider.name());
                }
                unavailable => outcome = unavailable,
            }
        }
        outcome
    }
}

/// 预告片会话状态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrailerOutcome {
    Idle,
    Loading,
    Ready {
        trailers: Vec<TrailerCandidate>,
        selected: usize,
    },
    NotFound,
    Unavailable {
        reason: TrailerUnavailable,
    },
}

impl TrailerOutcome {
    pub fn selected_trailer(&self) -> Option<&TrailerCandidate> {
        match self {
            TrailerOutcome::Ready { trailers, selected } => trailers.get(*selected),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            TrailerOutcome::NotFound => Some("No trailers found for this movie."),
            TrailerOutcome::Unavailable { reason } => Some(reason.message()),
            _ => None,
        }
    }
}

impl SlotOutcome for TrailerOutcome {
    fn idle() -> Self {
        TrailerOutcome::Idle
    }

    fn loading() -> Self {
        TrailerOutcome::Loading
    }
}

impl From<ProviderOutcome> for TrailerOutcome {
    fn from(outcome: ProviderOutcome) -> Self {
        match outcome {
            ProviderOutcome::Found(trailers) => TrailerOutcome::Ready {
                trailers,
                selected: 0,
            },
            ProviderOutcome::NoMatch => TrailerOutcome::NotFound,
            ProviderOutcome::Unavailable(reason) => TrailerOutcome::Unavailable { reason },
        }
    }
}

/// 预告片查看会话
///
/// 候选列表只在会话内有效，关闭后丢弃，进行中的查找结果也不再写入
pub struct TrailerSession {
    chain: TrailerChain,
    movie: Mutex<Option<MovieSummary>>,
    slot: LookupSlot<TrailerOutcome>,
}

impl TrailerSession {
    pub fn new(chain: TrailerChain) -> Self {
        Self {
            chain,
            movie: Mutex::new(None),
            slot: LookupSlot::new(),
        }
    }

    /// 为某部电影打开会话并查找预告片，返回结果是否生效
    pub async fn open(&self, movie: MovieSummary) -> bool {
        let generation = self
            .slot
            .begin_with(|| *self.movie.lock().unwrap_or_else(PoisonError::into_inner) = Some(movie.clone()));
        let outcome = self.chain.resolve(&movie).await;
        self.slot.settle(generation, outcome.into())
    }

    /// 对当前电影重新查找
    pub async fn retry(&self) -> bool {
        match self.current_movie() {
            Some(movie) => self.open(movie).await,
            None => false,
        }
    }

    /// 选择要播放的候选项，超出范围时不做改动
    pub fn select(&self, index: usize) -> bool {
        self.slot.modify(|outcome| match outcome {
            TrailerOutcome::Ready { trailers, selected } if index < trailers.len() => {
                *selected = index;
                true
            }
            _ => false,
        })
    }

    pub fn close(&self) {
        self.slot
            .reset_with(|| *self.movie.lock().unwrap_or_else(PoisonError::into_inner) = None);
    }

    pub fn current_movie(&self) -> Option<MovieSummary> {
        self.movie.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn outcome(&self) -> TrailerOutcome {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrailerOutcome> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, date: &str) -> MovieSummary {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": title,
            "release_date": date,
        }))
        .unwrap()
    }

    #[test]
    fn test_search_query_with_year() {
        assert_eq!(
            trailer_search_query(&movie("Dune", "2021-10-22")),
            "Dune 2021 official trailer"
        );
    }

    #[test]
    fn test_search_query_without_year_has_single_spaces() {
        assert_eq!(trailer_search_query(&movie("Dune", "")), "Dune official trailer");
    }

    #[test]
    fn test_outcome_messages() {
        let not_configured: TrailerOutcome =
            ProviderOutcome::Unavailable(TrailerUnavailable::NotConfigured).into();
        assert_eq!(
            not_configured.message(),
            Some("YouTube API key not configured. Please add YOUTUBE_API_KEY to your environment variables.")
        );

        let failed: TrailerOutcome = ProviderOutcome::Unavailable(TrailerUnavailable::SourceFailed).into();
        assert_eq!(failed.message(), Some("Unable to load trailers. Please try again later."));
        assert_eq!(TrailerOutcome::from(ProviderOutcome::NoMatch), TrailerOutcome::NotFound);
    }
}
