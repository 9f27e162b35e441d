// 榜单标签页
//
// 切换标签立即请求，结果截取前 8 条；旧标签的迟到响应被丢弃

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use super::bounded;
use super::lookup::{LookupOutcome, LookupSlot};
use super::reduce::failure_message;
use crate::external::{MovieCatalog, MovieRequest, TrendingTab};
use crate::models::MovieSummary;

/// 每个标签页展示的电影数
pub const TRENDING_LIMIT: usize = 8;

pub type TrendingOutcome = LookupOutcome<Vec<MovieSummary>>;

pub struct TrendingBoard {
    catalog: Arc<dyn MovieCatalog>,
    request_timeout: Duration,
    active_tab: Mutex<TrendingTab>,
    slot: LookupSlot<TrendingOutcome>,
}

impl TrendingBoard {
    pub fn new(catalog: Arc<dyn MovieCatalog>, request_timeout: Duration) -> Self {
        Self {
            catalog,
            request_timeout,
            active_tab: Mutex::new(TrendingTab::default()),
            slot: LookupSlot::new(),
        }
    }

    /// 切换到指定标签页并加载，返回本次是否生效
    pub async fn select_tab(&self, tab: TrendingTab) -> bool {
        let generation = self
            .slot
            .begin_with(|| *self.active_tab.lock().unwrap_or_else(PoisonError::into_inner) = tab);
        tracing::debug!("Loading {} movies (generation {})", tab, generation);

        let request = MovieRequest::Category(tab);
        let outcome = match bounded(self.request_timeout, self.catalog.fetch_movies(&request)).await {
            Ok(page) => {
                let mut movies = page.into_results();
                movies.truncate(TRENDING_LIMIT);
                LookupOutcome::Ready(movies)
            }
            Err(e) => {
                tracing::warn!("Error fetching {} movies: {}", tab, e);
                LookupOutcome::Failed(failure_message(&e))
            }
        };

        self.slot.settle(generation, outcome)
    }

    pub fn active_tab(&self) -> TrendingTab {
        *self.active_tab.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn outcome(&self) -> TrendingOutcome {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrendingOutcome> {
        self.slot.subscribe()
    }
}

/// 榜单卡片上的角标
pub fn badge(tab: TrendingTab, index: usize, movie: &MovieSummary) -> Option<String> {
    match tab {
        TrendingTab::Trending if index < 3 => Some(format!("#{} Trending", index + 1)),
        TrendingTab::Trending => None,
        TrendingTab::TopRated if movie.vote_average >= 8.0 => {
            Some(format!("⭐ {:.1}", movie.vote_average))
        }
        TrendingTab::TopRated => None,
        TrendingTab::Upcoming => Some("🎬 Coming Soon".to_string()),
        TrendingTab::NowPlaying => Some("🎭 In Theaters".to_string()),
    }
}

/// 榜单下方的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingStats {
    pub count: usize,
    pub count_label: &'static str,
    pub highly_rated: usize,
    pub highly_rated_label: &'static str,
    /// 即将上映/正在上映的数量，其他标签页为当前年份
    pub release_window: i64,
    pub release_window_label: &'static str,
}

impl TrendingStats {
    pub fn compute(tab: TrendingTab, movies: &[MovieSummary], today: NaiveDate) -> Self {
        let (threshold, highly_rated_label) = match tab {
            TrendingTab::TopRated => (8.0, "8+ Rated"),
            _ => (7.0, "Highly Rated"),
        };
        let highly_rated = movies
            .iter()
            .filter(|movie| movie.vote_average >= threshold)
            .count();

        let (release_window, release_window_label) = match tab {
            TrendingTab::Upcoming => (
                movies
                    .iter()
                    .filter(|movie| movie.release_date.is_some_and(|date| date > today))
                    .count() as i64,
                "Coming Soon",
            ),
            TrendingTab::NowPlaying => (
                movies
                    .iter()
                    .filter(|movie| movie.release_date.is_some_and(|date| date <= today))
                    .count() as i64,
                "Currently Showing",
            ),
            _ => (chrono::Datelike::year(&today) as i64, "Latest Releases"),
        };

        let count_label = match tab {
            TrendingTab::Trending => "Trending Movies",
            TrendingTab::TopRated => "Top Rated Movies",
            TrendingTab::Upcoming => "Upcoming Movies",
            TrendingTab::NowPlaying => "In Theaters",
        };

        Self {
            count: movies.len(),
            count_label,
            highly_rated,
            highly_rated_label,
            release_window,
            release_window_label,
        }
    }
}
