use serde::Serialize;

use super::MovieSummary;

/// 无结果时的提示
pub const NO_MOVIES_FOUND: &str = "No movies found. Try adjusting your filters.";

/// 查询结果状态，同一时刻只有一个可见
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome {
    #[default]
    Idle,
    Loading,
    Success(Vec<MovieSummary>),
    /// 不是失败，而是“没有匹配”的独立状态
    Empty(String),
    Failed(String),
}

impl QueryOutcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryOutcome::Loading)
    }

    /// 是否为某次查询的最终状态
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            QueryOutcome::Success(_) | QueryOutcome::Empty(_) | QueryOutcome::Failed(_)
        )
    }

    /// 当前结果列表，非成功状态为空
    pub fn movies(&self) -> &[MovieSummary] {
        match self {
            QueryOutcome::Success(movies) => movies,
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            QueryOutcome::Empty(message) | QueryOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}
