use crate::external::MovieRequest;
use crate::models::FilterState;

/// 根据已提交的搜索词和当前筛选条件选择请求
///
/// 有搜索词时只做标题搜索，类型和排序条件被忽略；否则走发现接口
pub fn select_request(committed_search: &str, filters: &FilterState) -> MovieRequest {
    let query = committed_search.trim();
    if !query.is_empty() {
        return MovieRequest::Search {
            query: query.to_string(),
        };
    }

    MovieRequest::Discover {
        sort: filters.sort_key,
        genres: filters.selected_genre_ids.clone(),
    }
}
