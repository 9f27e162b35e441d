// 应用装配
//
// 启动时先检查元数据凭据，缺失时直接返回配置错误，不会发出任何请求。
// 视频搜索凭据缺失只影响预告片回退。

use std::sync::Arc;

use crate::analytics::{SearchMetrics, SqliteSearchMetrics};
use crate::config::AppConfig;
use crate::database::Database;
use crate::error::Result;
use crate::external::{MovieCatalog, TmdbClient, VideoSearch, YoutubeClient};
use crate::pipeline::{
    CatalogTrailerProvider, DetailView, PipelineSettings, QueryPipeline, TrailerChain, TrailerProvider,
    TrailerSession, TrendingBoard, VideoSearchTrailerProvider,
};
use crate::session::{IdentityProvider, SessionManager, SessionStore, SqliteKeyValueStore, StubIdentityProvider};

/// 外部协作者，测试时可替换为内存实现
pub struct Collaborators {
    pub catalog: Arc<dyn MovieCatalog>,
    pub video_search: Option<Arc<dyn VideoSearch>>,
    pub metrics: Option<Arc<dyn SearchMetrics>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub session_store: SessionStore,
}

pub struct DiscoveryApp {
    pub config: AppConfig,
    pub query: QueryPipeline,
    pub trending: TrendingBoard,
    pub detail: DetailView,
    pub trailers: TrailerSession,
    pub session: SessionManager,
    pub metrics: Option<Arc<dyn SearchMetrics>>,
}

impl DiscoveryApp {
    /// 按配置创建真实的客户端和存储
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let tmdb_key = match config.require_tmdb_key() {
            Ok(key) => key.to_string(),
            Err(e) => {
                tracing::error!("{}", e);
                return Err(e);
            }
        };

        let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::with_base_url(
            tmdb_key,
            config.tmdb_base_url.clone(),
            config.request_timeout,
        )?);

        let video_search: Option<Arc<dyn VideoSearch>> = match config.youtube_api_key.clone() {
            Some(key) => Some(Arc::new(YoutubeClient::with_base_url(
                key,
                config.youtube_base_url.clone(),
                config.request_timeout,
            )?)),
            None => {
                tracing::warn!("YOUTUBE_API_KEY not set, trailer search fallback is disabled");
                None
            }
        };

        let database = Database::connect(&config.database_url).await?;
        let pool = database.pool().clone();
        let metrics: Arc<dyn SearchMetrics> = Arc::new(SqliteSearchMetrics::new(pool.clone()));

        let collaborators = Collaborators {
            catalog,
            video_search,
            metrics: Some(metrics),
            identity: Arc::new(StubIdentityProvider::new(config.auth_latency)),
            session_store: SessionStore::new(Arc::new(SqliteKeyValueStore::new(pool))),
        };

        Self::assemble(config, collaborators).await
    }

    /// 用给定的协作者装配各个管道并恢复已保存的会话
    pub async fn assemble(config: AppConfig, collaborators: Collaborators) -> Result<Self> {
        let settings = PipelineSettings {
            debounce: config.search_debounce,
            request_timeout: config.request_timeout,
        };

        let query = QueryPipeline::new(
            collaborators.catalog.clone(),
            collaborators.metrics.clone(),
            settings,
        );
        let trending = TrendingBoard::new(collaborators.catalog.clone(), config.request_timeout);
        let detail = DetailView::new(collaborators.catalog.clone(), config.request_timeout);

        let providers: Vec<Arc<dyn TrailerProvider>> = vec![
            Arc::new(CatalogTrailerProvider::new(
                collaborators.catalog.clone(),
                config.request_timeout,
            )),
            Arc::new(VideoSearchTrailerProvider::new(
                collaborators.video_search.clone(),
                config.request_timeout,
            )),
        ];
        let trailers = TrailerSession::new(TrailerChain::new(providers));

        let session = SessionManager::new(collaborators.identity, collaborators.session_store);
        session.restore().await?;

        tracing::info!("Movie discovery initialized");

        Ok(Self {
            config,
            query,
            trending,
            detail,
            trailers,
            session,
            metrics: collaborators.metrics,
        })
    }

    /// 初次加载：发现列表和默认榜单
    pub async fn start(&self) {
        self.query.refresh();
        let tab = self.trending.active_tab();
        self.trending.select_tab(tab).await;
    }
}
