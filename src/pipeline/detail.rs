use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use super::bounded;
use super::lookup::{LookupOutcome, LookupSlot};
use crate::external::MovieCatalog;
use crate::models::MovieDetails;

pub type DetailOutcome = LookupOutcome<Box<MovieDetails>>;

/// 电影详情视图
///
/// 同一时间只展示一部电影；关闭或切换后，之前请求的结果不会再写入
pub struct DetailView {
    catalog: Arc<dyn MovieCatalog>,
    request_timeout: Duration,
    movie_id: Mutex<Option<u64>>,
    slot: LookupSlot<DetailOutcome>,
}

impl DetailView {
    pub fn new(catalog: Arc<dyn MovieCatalog>, request_timeout: Duration) -> Self {
        Self {
            catalog,
            request_timeout,
            movie_id: Mutex::new(None),
            slot: LookupSlot::new(),
        }
    }

    /// 打开并加载详情，返回结果是否生效
    pub async fn open(&self, movie_id: u64) -> bool {
        let generation = self
            .slot
            .begin_with(|| *self.movie_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(movie_id));

        let outcome = match bounded(self.request_timeout, self.catalog.movie_details(movie_id)).await {
            Ok(details) => LookupOutcome::Ready(Box::new(details)),
            Err(e) => {
                tracing::warn!("Error fetching movie details for {}: {}", movie_id, e);
                LookupOutcome::Failed(format!("Failed to load movie details: {}", e))
            }
        };

        self.slot.settle(generation, outcome)
    }

    pub fn close(&self) {
        self.slot
            .reset_with(|| *self.movie_id.lock().unwrap_or_else(PoisonError::into_inner) = None);
    }

    pub fn movie_id(&self) -> Option<u64> {
        *self.movie_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn outcome(&self) -> DetailOutcome {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailOutcome> {
        self.slot.subscribe()
    }
}
