pub mod request;
pub mod tmdb;
pub mod youtube;

use async_trait::async_trait;

pub use request::{MovieRequest, TrendingTab};
pub use tmdb::TmdbClient;
pub use youtube::YoutubeClient;

use crate::error::Result;
use crate::models::{CatalogVideo, MovieDetails, MoviePage, TrailerCandidate};

/// 电影元数据目录
///
/// 抽象外部元数据接口，测试中可替换为内存实现
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// 列表类请求（搜索、发现、榜单）
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<MoviePage>;

    /// 电影详情，附带演职人员、视频和相似电影
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails>;

    /// 电影的视频列表（未过滤）
    async fn movie_videos(&self, movie_id: u64) -> Result<Vec<CatalogVideo>>;
}

/// 视频搜索服务（预告片回退来源）
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_videos(&self, query: &str) -> Result<Vec<TrailerCandidate>>;
}
