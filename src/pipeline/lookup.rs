use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// 可由 `LookupSlot` 管理的状态类型
pub trait SlotOutcome: Clone + Send + Sync + 'static {
    fn idle() -> Self;
    fn loading() -> Self;
}

/// 辅助查询（榜单、详情）的状态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LookupOutcome<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for LookupOutcome<T> {
    fn default() -> Self {
        LookupOutcome::Idle
    }
}

impl<T> LookupOutcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LookupOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LookupOutcome::Loading)
    }
}

impl<T: Clone + Send + Sync + 'static> SlotOutcome for LookupOutcome<T> {
    fn idle() -> Self {
        LookupOutcome::Idle
    }

    fn loading() -> Self {
        LookupOutcome::Loading
    }
}

/// 带代次令牌的单值状态槽
///
/// 每次 `begin` 开启新的代次并立即发布 Loading；只有最新代次的 `settle` 会生效
pub struct LookupSlot<O: SlotOutcome> {
    generation: Mutex<u64>,
    outcome: watch::Sender<O>,
}

impl<O: SlotOutcome> LookupSlot<O> {
    pub fn new() -> Self {
        let (outcome, _) = watch::channel(O::idle());
        Self {
            generation: Mutex::new(0),
            outcome,
        }
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 开启新代次
    pub fn begin(&self) -> u64 {
        self.begin_with(|| ())
    }

    /// 开启新代次，`select` 与代次递增在同一把锁内执行
    ///
    /// 调用方用它记录当前选中项，保证选中项总是对应最新代次
    pub fn begin_with<F: FnOnce()>(&self, select: F) -> u64 {
        let mut generation = self.lock_generation();
        select();
        *generation += 1;
        self.outcome.send_replace(O::loading());
        *generation
    }

    /// 发布某代次的结果，代次已过期时丢弃并返回 false
    pub fn settle(&self, generation: u64, outcome: O) -> bool {
        let current = self.lock_generation();
        if *current != generation {
            tracing::debug!("Discarding stale lookup result (generation {}, current {})", generation, *current);
            return false;
        }
        self.outcome.send_replace(outcome);
        true
    }

    /// 作废进行中的代次并回到 Idle
    pub fn reset(&self) {
        self.reset_with(|| ())
    }

    /// 同 `reset`，`clear` 在代次锁内执行
    pub fn reset_with<F: FnOnce()>(&self, clear: F) {
        let mut generation = self.lock_generation();
        clear();
        *generation += 1;
        self.outcome.send_replace(O::idle());
    }

    /// 原地修改当前状态，返回是否有改动
    pub fn modify<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut O) -> bool,
    {
        let _generation = self.lock_generation();
        self.outcome.send_if_modified(f)
    }

    pub fn generation(&self) -> u64 {
        *self.lock_generation()
    }

    pub fn current(&self) -> O {
        self.outcome.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<O> {
        self.outcome.subscribe()
    }
}

impl<O: SlotOutcome> Default for LookupSlot<O> {
    fn default() -> Self {
        Self::new()
    }
}
