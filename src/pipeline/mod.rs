pub mod detail;
pub mod lookup;
pub mod query;
pub mod reduce;
pub mod request;
pub mod trailer;
pub mod trending;

use std::future::Future;
use std::time::Duration;

pub use detail::{DetailOutcome, DetailView};
pub use lookup::{LookupOutcome, LookupSlot, SlotOutcome};
pub use query::{PipelinePhase, PipelineSettings, QueryPipeline};
pub use reduce::{failure_message, reduce_response};
pub use request::select_request;
pub use trailer::{
    trailer_search_query, CatalogTrailerProvider, ProviderOutcome, TrailerChain, TrailerOutcome,
    TrailerProvider, TrailerSession, TrailerUnavailable, VideoSearchTrailerProvider,
};
pub use trending::{badge, TrendingBoard, TrendingOutcome, TrendingStats, TRENDING_LIMIT};

use crate::error::{DiscoveryError, Result};

/// 为外部请求加上超时，超时转换为 `DiscoveryError::Timeout`
pub(crate) async fn bounded<T, F>(timeout: Duration, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => Err(DiscoveryError::Timeout(timeout)),
    }
}
