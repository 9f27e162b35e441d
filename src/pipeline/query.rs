// 查询管道
//
// 状态机：Idle -> Debouncing -> InFlight(generation) -> Resolved
//
// - 搜索文本经过防抖后才提交；类型、排序变化立即触发
// - 每次触发开启新代次并同步发布 Loading
// - 只有最新代次的响应能写入结果，过期响应静默丢弃
// - 文本搜索成功后尽力记录搜索统计，失败只写日志

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::bounded;
use super::reduce::reduce_response;
use super::request::select_request;
use crate::analytics::SearchMetrics;
use crate::external::{MovieCatalog, MovieRequest};
use crate::models::{FilterState, MovieSummary, QueryOutcome, SortKey, ViewMode};

/// 管道参数
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// 搜索文本的静默间隔
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// 管道所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    /// 有未到期的防抖计时器
    Debouncing,
    InFlight(u64),
    Resolved,
}

struct PipelineState {
    filters: FilterState,
    /// 防抖后提交的搜索文本
    committed_search: String,
    generation: u64,
    in_flight: Option<u64>,
    debounce_seq: u64,
    debounce_task: Option<JoinHandle<()>>,
}

impl PipelineState {
    fn phase(&self) -> PipelinePhase {
        if self.debounce_task.is_some() {
            PipelinePhase::Debouncing
        } else if let Some(generation) = self.in_flight {
            PipelinePhase::InFlight(generation)
        } else if self.generation > 0 {
            PipelinePhase::Resolved
        } else {
            PipelinePhase::Idle
        }
    }

    fn cancel_debounce(&mut self) {
        self.debounce_seq += 1;
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }
}

struct PipelineInner {
    catalog: Arc<dyn MovieCatalog>,
    metrics: Option<Arc<dyn SearchMetrics>>,
    settings: PipelineSettings,
    state: Mutex<PipelineState>,
    outcome: watch::Sender<QueryOutcome>,
}

impl PipelineInner {
    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 开启新代次：递增令牌、同步发布 Loading、派发请求
    fn begin_generation(self: &Arc<Self>, state: &mut PipelineState) -> u64 {
        state.generation += 1;
        let generation = state.generation;
        let request = select_request(&state.committed_search, &state.filters);
        state.in_flight = Some(generation);

        self.outcome.send_replace(QueryOutcome::Loading);
        tracing::debug!("Starting query generation {}: {}", generation, request);

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_generation(generation, request).await;
        });

        generation
    }

    async fn run_generation(self: Arc<Self>, generation: u64, request: MovieRequest) {
        let result = bounded(self.settings.request_timeout, self.catalog.fetch_movies(&request)).await;
        if let Err(ref e) = result {
            tracing::warn!("Error fetching movies ({}): {}", request, e);
        }

        let outcome = reduce_response(result);
        let representative = match (&outcome, request.search_term()) {
            (QueryOutcome::Success(movies), Some(term)) => {
                movies.first().cloned().map(|movie| (term.to_string(), movie))
            }
            _ => None,
        };

        {
            let mut state = self.lock_state();
            if state.generation != generation {
                tracing::debug!(
                    "Discarding stale response for generation {} (current {})",
                    generation,
                    state.generation
                );
                return;
            }
            state.in_flight = None;
            self.outcome.send_replace(outcome);
        }

        if let Some((term, movie)) = representative {
            self.record_search(term, movie);
        }
    }

    /// 防抖到期：提交文本，值有变化时开启新代次
    fn commit_search(self: &Arc<Self>, seq: u64, text: String) {
        let mut state = self.lock_state();
        if state.debounce_seq != seq {
            return;
        }
        state.debounce_task = None;

        if state.committed_search == text {
            tracing::debug!("Search text unchanged after debounce, no request issued");
            return;
        }
        state.committed_search = text;
        self.begin_generation(&mut state);
    }

    /// 搜索统计，失败不影响结果
    fn record_search(&self, term: String, movie: MovieSummary) {
        let Some(metrics) = self.metrics.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = metrics.record_search(&term, &movie).await {
                tracing::warn!("Failed to record search for '{}': {}", term, e);
            }
        });
    }
}

/// 查询管道句柄，可廉价克隆
#[derive(Clone)]
pub struct QueryPipeline {
    inner: Arc<PipelineInner>,
}

impl QueryPipeline {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        metrics: Option<Arc<dyn SearchMetrics>>,
        settings: PipelineSettings,
    ) -> Self {
        let (outcome, _) = watch::channel(QueryOutcome::Idle);
        let state = PipelineState {
            filters: FilterState::default(),
            committed_search: String::new(),
            generation: 0,
            in_flight: None,
            debounce_seq: 0,
            debounce_task: None,
        };

        Self {
            inner: Arc::new(PipelineInner {
                catalog,
                metrics,
                settings,
                state: Mutex::new(state),
                outcome,
            }),
        }
    }

    /// 搜索框输入，经过防抖后才会发出请求
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.inner.lock_state();
        state.filters.search_text = text.clone();
        state.cancel_debounce();

        let seq = state.debounce_seq;
        let delay = self.inner.settings.debounce;
        let inner = Arc::clone(&self.inner);
        state.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.commit_search(seq, text);
        }));
    }

    /// 切换类型，立即触发
    pub fn toggle_genre(&self, genre_id: u32) -> u64 {
        let mut state = self.inner.lock_state();
        state.filters.toggle_genre(genre_id);
        self.inner.begin_generation(&mut state)
    }

    /// 修改排序，值未变化时不触发
    pub fn set_sort(&self, sort_key: SortKey) -> Option<u64> {
        let mut state = self.inner.lock_state();
        if state.filters.sort_key == sort_key {
            return None;
        }
        state.filters.sort_key = sort_key;
        Some(self.inner.begin_generation(&mut state))
    }

    /// 展示模式只影响呈现
    pub fn set_view_mode(&self, view_mode: ViewMode) {
        self.inner.lock_state().filters.view_mode = view_mode;
    }

    /// 清空筛选：取消待提交的输入，重置条件并立即查询一次
    pub fn clear_filters(&self) -> u64 {
        let mut state = self.inner.lock_state();
        state.cancel_debounce();
        state.filters.clear();
        state.committed_search.clear();
        self.inner.begin_generation(&mut state)
    }

    /// 以当前已提交的条件重新查询（初次加载、重试）
    pub fn refresh(&self) -> u64 {
        let mut state = self.inner.lock_state();
        self.inner.begin_generation(&mut state)
    }

    pub fn outcome(&self) -> QueryOutcome {
        self.inner.outcome.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryOutcome> {
        self.inner.outcome.subscribe()
    }

    pub fn filters(&self) -> FilterState {
        self.inner.lock_state().filters.clone()
    }

    pub fn committed_search(&self) -> String {
        self.inner.lock_state().committed_search.clone()
    }

    pub fn phase(&self) -> PipelinePhase {
        self.inner.lock_state().phase()
    }

    /// 最近一次开启的代次
    pub fn generation(&self) -> u64 {
        self.inner.lock_state().generation
    }
}
