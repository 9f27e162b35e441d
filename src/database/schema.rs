use sqlx::{Pool, Sqlite};

use crate::error::{DiscoveryError, Result};

/// 建表语句（幂等）
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS user_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS search_metrics (
        id TEXT PRIMARY KEY NOT NULL,
        search_term TEXT NOT NULL UNIQUE,
        hit_count INTEGER NOT NULL DEFAULT 1,
        movie_id INTEGER NOT NULL,
        poster_url TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_search_metrics_hits ON search_metrics (hit_count DESC)",
];

/// 创建所需的表和索引
pub async fn initialize(pool: &Pool<Sqlite>) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// 验证数据库schema完整性
pub async fn verify_schema(pool: &Pool<Sqlite>) -> Result<()> {
    let required_tables = ["user_settings", "search_metrics"];

    for table in required_tables {
        let exists = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
            .bind(table)
            .fetch_optional(pool)
            .await?;

        if exists.is_none() {
            return Err(DiscoveryError::Configuration(format!(
                "Required table '{}' does not exist",
                table
            )));
        }
    }

    tracing::debug!("Database schema verification completed successfully");
    Ok(())
}

/// 数据库统计信息
#[derive(Debug, Clone, Copy)]
pub struct DatabaseStats {
    pub settings_count: i64,
    pub search_term_count: i64,
}

pub async fn get_database_stats(pool: &Pool<Sqlite>) -> Result<DatabaseStats> {
    let settings_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_settings")
        .fetch_one(pool)
        .await?;

    let search_term_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_metrics")
        .fetch_one(pool)
        .await?;

    Ok(DatabaseStats {
        settings_count,
        search_term_count,
    })
}
