use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::SortKey;

/// 榜单标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendingTab {
    #[default]
    Trending,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl TrendingTab {
    pub const ALL: [TrendingTab; 4] = [
        TrendingTab::Trending,
        TrendingTab::TopRated,
        TrendingTab::Upcoming,
        TrendingTab::NowPlaying,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            TrendingTab::Trending => "/trending/movie/week",
            TrendingTab::TopRated => "/movie/top_rated",
            TrendingTab::Upcoming => "/movie/upcoming",
            TrendingTab::NowPlaying => "/movie/now_playing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendingTab::Trending => "🔥 Trending This Week",
            TrendingTab::TopRated => "⭐ Top Rated",
            TrendingTab::Upcoming => "🎬 Coming Soon",
            TrendingTab::NowPlaying => "🎭 In Theaters",
        }
    }

    fn as_name(&self) -> &'static str {
        match self {
            TrendingTab::Trending => "trending",
            TrendingTab::TopRated => "top_rated",
            TrendingTab::Upcoming => "upcoming",
            TrendingTab::NowPlaying => "now_playing",
        }
    }
}

impl fmt::Display for TrendingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

impl FromStr for TrendingTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        TrendingTab::ALL
            .iter()
            .copied()
            .find(|tab| tab.as_name() == needle)
            .ok_or_else(|| format!("unknown tab '{}'", s.trim()))
    }
}

/// 列表类请求（标题搜索、发现、榜单），互斥
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieRequest {
    /// 标题搜索，`query` 已去除首尾空白
    Search { query: String },
    /// 按排序与类型发现
    Discover { sort: SortKey, genres: Vec<u32> },
    Category(TrendingTab),
}

impl MovieRequest {
    /// 相对于服务根地址的路径
    pub fn path(&self) -> &'static str {
        match self {
            MovieRequest::Search { .. } => "/search/movie",
            MovieRequest::Discover { .. } => "/discover/movie",
            MovieRequest::Category(tab) => tab.endpoint(),
        }
    }

    /// 查询参数（未编码，由 HTTP 客户端负责编码）
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            MovieRequest::Search { query } => vec![("query", query.clone())],
            MovieRequest::Discover { sort, genres } => {
                let mut params = vec![("sort_by", sort.as_param().to_string())];
                if !genres.is_empty() {
                    let csv = genres
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    params.push(("with_genres", csv));
                }
                params
            }
            MovieRequest::Category(_) => Vec::new(),
        }
    }

    /// 搜索词（仅标题搜索有）
    pub fn search_term(&self) -> Option<&str> {
        match self {
            MovieRequest::Search { query } => Some(query),
            _ => None,
        }
    }
}

impl fmt::Display for MovieRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .query_params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        if params.is_empty() {
            write!(f, "GET {}", self.path())
        } else {
            write!(f, "GET {}?{}", self.path(), params)
        }
    }
}
