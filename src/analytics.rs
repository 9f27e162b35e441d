// 搜索统计
//
// 记录每个搜索词的命中次数以及代表性电影，供“热门搜索”展示。
// 记录失败只写日志，不影响查询结果。

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::error::Result;
use crate::models::{ImageSize, MovieSummary};

/// 搜索统计接口（按搜索词 upsert）
#[async_trait]
pub trait SearchMetrics: Send + Sync {
    /// 搜索词命中次数加一，首次记录时保存代表性电影
    async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<()>;

    /// 命中次数最多的搜索词
    async fn top_searches(&self, limit: u32) -> Result<Vec<SearchMetric>>;
}

/// 单个搜索词的统计
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SearchMetric {
    pub id: String,
    pub search_term: String,
    pub hit_count: i64,
    pub movie_id: i64,
    pub poster_url: Option<String>,
    pub updated_at: String,
}

/// SQLite 实现
#[derive(Clone)]
pub struct SqliteSearchMetrics {
    pool: Pool<Sqlite>,
}

impl SqliteSearchMetrics {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchMetrics for SqliteSearchMetrics {
    async fn record_search(&self, term: &str, movie: &MovieSummary) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let poster_url = movie
            .poster_path
            .as_ref()
            .map(|_| movie.poster_url(ImageSize::W500));

        sqlx::query(
            r#"
            INSERT INTO search_metrics (id, search_term, hit_count, movie_id, poster_url, created_at, updated_at)
            VALUES (?, ?, 1, ?, ?, ?, ?)
            ON CONFLICT(search_term) DO UPDATE SET
                hit_count = hit_count + 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(term)
        .bind(movie.id as i64)
        .bind(poster_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Recorded search for '{}' (movie {})", term, movie.id);
        Ok(())
    }

    async fn top_searches(&self, limit: u32) -> Result<Vec<SearchMetric>> {
        let metrics = sqlx::query_as::<_, SearchMetric>(
            r#"
            SELECT id, search_term, hit_count, movie_id, poster_url, updated_at
            FROM search_metrics
            ORDER BY hit_count DESC, updated_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }
}
