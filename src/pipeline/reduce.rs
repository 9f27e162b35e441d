use crate::error::{DiscoveryError, Result};
use crate::models::{MoviePage, QueryOutcome, NO_MOVIES_FOUND};

/// 将一次列表请求的结果归约为查询状态
///
/// - 非 2xx 状态：`Failed("Failed to fetch movies: <status> <reason>")`
/// - 结果为空或缺失：`Empty`
/// - 其他错误（网络、解析、超时）：`Failed("Error fetching movies: <message>")`
pub fn reduce_response(result: Result<MoviePage>) -> QueryOutcome {
    match result {
        Ok(page) => match page.results {
            Some(results) if !results.is_empty() => QueryOutcome::Success(results),
            _ => QueryOutcome::Empty(NO_MOVIES_FOUND.to_string()),
        },
        Err(e) => QueryOutcome::Failed(failure_message(&e)),
    }
}

/// 请求失败时展示给用户的文本
pub fn failure_message(error: &DiscoveryError) -> String {
    match error {
        DiscoveryError::Http { status, reason } => {
            format!("Failed to fetch movies: {} {}", status, reason)
        }
        e => format!("Error fetching movies: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieSummary;
    use std::time::Duration;

    fn movie(id: u64) -> MovieSummary {
        serde_json::from_value(serde_json::json!({"id": id, "title": "x"})).unwrap()
    }

    #[test]
    fn test_success() {
        let outcome = reduce_response(Ok(MoviePage::with_results(vec![movie(1), movie(2)])));
        assert_eq!(outcome.movies().len(), 2);
    }

    #[test]
    fn test_empty_and_missing_results_are_empty_not_failed() {
        let empty = reduce_response(Ok(MoviePage::with_results(Vec::new())));
        let missing = reduce_response(Ok(MoviePage::default()));
        assert_eq!(empty, QueryOutcome::Empty(NO_MOVIES_FOUND.to_string()));
        assert_eq!(missing, QueryOutcome::Empty(NO_MOVIES_FOUND.to_string()));
    }

    #[test]
    fn test_http_status_failure() {
        let outcome = reduce_response(Err(DiscoveryError::Http {
            status: 500,
            reason: "Internal Server Error".to_string(),
        }));
        assert_eq!(
            outcome,
            QueryOutcome::Failed("Failed to fetch movies: 500 Internal Server Error".to_string())
        );
        assert!(outcome.movies().is_empty());
    }

    #[test]
    fn test_network_and_timeout_failures() {
        let network = reduce_response(Err(DiscoveryError::Network("connection refused".to_string())));
        assert_eq!(
            network,
            QueryOutcome::Failed("Error fetching movies: connection refused".to_string())
        );

        let timeout = reduce_response(Err(DiscoveryError::Timeout(Duration::from_secs(15))));
        assert_eq!(
            timeout,
            QueryOutcome::Failed("Error fetching movies: request timed out after 15s".to_string())
        );
    }
}
