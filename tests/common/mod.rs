// 集成测试共用的内存协作者

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use movie_discovery::analytics::{SearchMetric, SearchMetrics};
use movie_discovery::error::{DiscoveryError, Result};
use movie_discovery::external::{MovieCatalog, MovieRequest, VideoSearch};
use movie_discovery::models::{
    CatalogVideo, MovieDetails, MoviePage, MovieSummary, QueryOutcome, TrailerCandidate, TrailerSource,
};

pub fn movie(id: u64, title: &str) -> MovieSummary {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "release_date": "2022-03-04",
        "vote_average": 7.5,
    }))
    .unwrap()
}

pub fn video(key: &str, site: &str, video_type: &str) -> CatalogVideo {
    CatalogVideo {
        key: key.to_string(),
        name: format!("{} {}", video_type, key),
        site: site.to_string(),
        video_type: video_type.to_string(),
    }
}

pub fn candidate(id: &str) -> TrailerCandidate {
    TrailerCandidate {
        id: id.to_string(),
        title: format!("Trailer {}", id),
        source: TrailerSource::VideoSearch,
        thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
    }
}

pub fn http_error(status: u16, reason: &str) -> DiscoveryError {
    DiscoveryError::Http {
        status,
        reason: reason.to_string(),
    }
}

type Responder = Box<dyn Fn(&MovieRequest) -> (Duration, Result<MoviePage>) + Send + Sync>;

/// 按请求脚本化响应的目录，记录收到的所有请求
pub struct FakeCatalog {
    responder: Mutex<Responder>,
    requests: Mutex<Vec<MovieRequest>>,
    videos: Mutex<Result<Vec<CatalogVideo>>>,
    video_calls: Mutex<u32>,
    details: Mutex<HashMap<u64, MovieDetails>>,
}

impl FakeCatalog {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&MovieRequest) -> (Duration, Result<MoviePage>) + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Mutex::new(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
            videos: Mutex::new(Ok(Vec::new())),
            video_calls: Mutex::new(0),
            details: Mutex::new(HashMap::new()),
        })
    }

    /// 每个请求立即返回同一部电影
    pub fn echo() -> Arc<Self> {
        Self::new(|_| (Duration::ZERO, Ok(MoviePage::with_results(vec![movie(1, "Echo")]))))
    }

    pub fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&MovieRequest) -> (Duration, Result<MoviePage>) + Send + Sync + 'static,
    {
        *self.responder.lock().unwrap() = Box::new(responder);
    }

    pub fn set_videos(&self, videos: Result<Vec<CatalogVideo>>) {
        *self.videos.lock().unwrap() = videos;
    }

    pub fn insert_details(&self, details: MovieDetails) {
        self.details.lock().unwrap().insert(details.id, details);
    }

    pub fn requests(&self) -> Vec<MovieRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn video_calls(&self) -> u32 {
        *self.video_calls.lock().unwrap()
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<MoviePage> {
        self.requests.lock().unwrap().push(request.clone());
        let (delay, response) = {
            let responder = self.responder.lock().unwrap();
            (*responder)(request)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        self.details
            .lock()
            .unwrap()
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| http_error(404, "Not Found"))
    }

    async fn movie_videos(&self, _movie_id: u64) -> Result<Vec<CatalogVideo>> {
        *self.video_calls.lock().unwrap() += 1;
        match &*self.videos.lock().unwrap() {
            Ok(videos) => Ok(videos.clone()),
            Err(_) => Err(DiscoveryError::Network("connection reset".to_string())),
        }
    }
}

/// 视频搜索替身，记录收到的关键词
pub struct FakeVideoSearch {
    response: Mutex<Option<Vec<TrailerCandidate>>>,
    queries: Mutex<Vec<String>>,
    delay: Duration,
}

impl FakeVideoSearch {
    /// `None` 表示每次调用都失败
    pub fn new(response: Option<Vec<TrailerCandidate>>) -> Arc<Self> {
        Self::with_delay(response, Duration::ZERO)
    }

    pub fn with_delay(response: Option<Vec<TrailerCandidate>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            queries: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSearch for FakeVideoSearch {
    async fn search_videos(&self, query: &str) -> Result<Vec<TrailerCandidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &*self.response.lock().unwrap() {
            Some(items) => Ok(items.clone()),
            None => Err(http_error(403, "Forbidden")),
        }
    }
}

/// 记录调用的统计替身，可配置为总是失败
#[derive(Default)]
pub struct RecordingMetrics {
    pub fail: bool,
    pub calls: Mutex<Vec<(String, u64)>>,
}

impl RecordingMetrics {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchMetrics for RecordingMetrics {
    async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<()> {
        self.calls.lock().unwrap().push((term.to_string(), movie.id));
        if self.fail {
            return Err(DiscoveryError::Network("analytics backend unreachable".to_string()));
        }
        Ok(())
    }

    async fn top_searches(&self, _limit: u32) -> Result<Vec<SearchMetric>> {
        Ok(Vec::new())
    }
}

/// 等待查询进入最终状态
pub async fn settled(rx: &mut watch::Receiver<QueryOutcome>) -> QueryOutcome {
    rx.wait_for(|outcome| outcome.is_settled()).await.unwrap().clone()
}
