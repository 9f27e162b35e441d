// 查询管道集成测试
//
// 使用暂停的时钟验证防抖、代次与结果归约

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{http_error, movie, settled, FakeCatalog, RecordingMetrics};
use movie_discovery::analytics::SearchMetrics;
use movie_discovery::external::MovieRequest;
use movie_discovery::models::{FilterState, MoviePage, QueryOutcome, SortKey, ViewMode, NO_MOVIES_FOUND};
use movie_discovery::pipeline::{PipelinePhase, PipelineSettings, QueryPipeline};

fn pipeline(catalog: &Arc<FakeCatalog>, metrics: Option<Arc<dyn SearchMetrics>>) -> QueryPipeline {
    QueryPipeline::new(catalog.clone(), metrics, PipelineSettings::default())
}

fn search(query: &str) -> MovieRequest {
    MovieRequest::Search {
        query: query.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_typing_batman_issues_one_search_after_pause() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    // 300ms 内逐字输入
    for prefix in ["b", "ba", "bat", "batm", "batma", "batman"] {
        pipeline.set_search_text(prefix);
        tokio::time::sleep(Duration::from_millis(60)).await;
    }
    assert_eq!(pipeline.phase(), PipelinePhase::Debouncing);
    assert!(catalog.requests().is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let outcome = settled(&mut rx).await;

    assert_eq!(catalog.requests(), vec![search("batman")]);
    assert_eq!(outcome.movies().len(), 1);
    assert_eq!(pipeline.committed_search(), "batman");
    assert_eq!(pipeline.phase(), PipelinePhase::Resolved);
}

#[tokio::test(start_paused = true)]
async fn test_input_within_window_coalesces_to_final_value() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);

    pipeline.set_search_text("alien");
    tokio::time::sleep(Duration::from_millis(499)).await;
    pipeline.set_search_text("aliens");
    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(catalog.requests().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    tokio::task::yield_now().await;
    assert_eq!(catalog.requests(), vec![search("aliens")]);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_committed_text_does_not_refetch() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.set_search_text("dune");
    tokio::time::sleep(Duration::from_millis(600)).await;
    settled(&mut rx).await;

    // 改了又改回来，提交值没有变化
    pipeline.set_search_text("dune 2");
    tokio::time::sleep(Duration::from_millis(100)).await;
    pipeline.set_search_text("dune");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(catalog.requests(), vec![search("dune")]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_earlier_response_never_overwrites_later_one() {
    let catalog = FakeCatalog::new(|request| match request {
        MovieRequest::Discover { sort: SortKey::RatingDesc, .. } => (
            Duration::from_millis(300),
            Ok(MoviePage::with_results(vec![movie(1, "Stale")])),
        ),
        _ => (
            Duration::from_millis(50),
            Ok(MoviePage::with_results(vec![movie(2, "Fresh")])),
        ),
    });
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    let first = pipeline.set_sort(SortKey::RatingDesc).unwrap();
    let second = pipeline.set_sort(SortKey::TitleAsc).unwrap();
    assert!(second > first);
    assert_eq!(pipeline.phase(), PipelinePhase::InFlight(second));

    let outcome = settled(&mut rx).await;
    assert_eq!(outcome.movies()[0].title, "Fresh");

    // 让过期的请求也完成
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(pipeline.outcome().movies()[0].title, "Fresh");
    assert_eq!(catalog.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_search_response_is_not_recorded() {
    let catalog = FakeCatalog::new(|request| match request {
        MovieRequest::Search { query } if query == "slow" => (
            Duration::from_secs(2),
            Ok(MoviePage::with_results(vec![movie(1, "Slow")])),
        ),
        _ => (
            Duration::from_millis(10),
            Ok(MoviePage::with_results(vec![movie(2, "Fast")])),
        ),
    });
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = pipeline(&catalog, Some(metrics.clone()));
    let mut rx = pipeline.subscribe();

    pipeline.set_search_text("slow");
    tokio::time::sleep(Duration::from_millis(600)).await;
    pipeline.set_search_text("fast");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(settled(&mut rx).await.movies()[0].title, "Fast");

    // 等过期请求返回
    tokio::time::sleep(Duration::from_secs(3)).await;
    tokio::task::yield_now().await;

    assert_eq!(catalog.requests(), vec![search("slow"), search("fast")]);
    assert_eq!(pipeline.outcome().movies()[0].title, "Fast");
    assert_eq!(metrics.calls(), vec![("fast".to_string(), 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_genre_toggle_during_debounce_uses_committed_text() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);

    pipeline.set_search_text("heat");
    tokio::time::sleep(Duration::from_millis(100)).await;
    pipeline.toggle_genre(28);
    tokio::task::yield_now().await;

    // 搜索词尚未提交，类型切换立即按发现请求发出
    assert_eq!(
        catalog.requests(),
        vec![MovieRequest::Discover {
            sort: SortKey::PopularityDesc,
            genres: vec![28],
        }]
    );
    assert_eq!(pipeline.committed_search(), "");

    tokio::time::sleep(Duration::from_millis(500)).await;
    tokio::task::yield_now().await;
    assert_eq!(catalog.requests().last(), Some(&search("heat")));
    assert_eq!(catalog.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_ignores_genre_and_sort() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.toggle_genre(28);
    pipeline.set_sort(SortKey::ReleaseDesc);
    settled(&mut rx).await;

    pipeline.set_search_text("  heat ");
    tokio::time::sleep(Duration::from_millis(600)).await;
    settled(&mut rx).await;

    let requests = catalog.requests();
    assert_eq!(requests.last(), Some(&search("heat")));
    assert_eq!(requests.last().unwrap().query_params(), vec![("query", "heat".to_string())]);

    // 有搜索词时切换类型仍然只做标题搜索
    pipeline.toggle_genre(35);
    settled(&mut rx).await;
    assert_eq!(catalog.requests().last(), Some(&search("heat")));
}

#[tokio::test(start_paused = true)]
async fn test_discover_carries_sort_and_genres_in_selection_order() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);

    pipeline.toggle_genre(35);
    pipeline.toggle_genre(28);
    pipeline.set_sort(SortKey::RatingDesc);
    tokio::task::yield_now().await;

    let last = catalog.requests().last().cloned().unwrap();
    assert_eq!(
        last.query_params(),
        vec![
            ("sort_by", "vote_average.desc".to_string()),
            ("with_genres", "35,28".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_http_500_clears_previous_results() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.refresh();
    assert_eq!(settled(&mut rx).await.movies().len(), 1);

    catalog.respond_with(|_| (Duration::ZERO, Err(http_error(500, "Internal Server Error"))));
    pipeline.refresh();
    assert!(pipeline.outcome().is_loading());

    let outcome = settled(&mut rx).await;
    assert_eq!(
        outcome,
        QueryOutcome::Failed("Failed to fetch movies: 500 Internal Server Error".to_string())
    );
    assert!(outcome.movies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_and_missing_results_are_empty_state() {
    let catalog = FakeCatalog::new(|_| (Duration::ZERO, Ok(MoviePage::default())));
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.refresh();
    assert_eq!(settled(&mut rx).await, QueryOutcome::Empty(NO_MOVIES_FOUND.to_string()));

    catalog.respond_with(|_| (Duration::ZERO, Ok(MoviePage::with_results(Vec::new()))));
    pipeline.refresh();
    assert_eq!(settled(&mut rx).await, QueryOutcome::Empty(NO_MOVIES_FOUND.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_slow_catalog_times_out_into_failed() {
    let catalog = FakeCatalog::new(|_| (Duration::from_secs(60), Ok(MoviePage::default())));
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.refresh();
    assert_eq!(
        settled(&mut rx).await,
        QueryOutcome::Failed("Error fetching movies: request timed out after 15s".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_successful_search_records_representative_movie() {
    let catalog = FakeCatalog::new(|_| {
        (
            Duration::ZERO,
            Ok(MoviePage::with_results(vec![movie(268, "Batman"), movie(272, "Batman Begins")])),
        )
    });
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = pipeline(&catalog, Some(metrics.clone()));
    let mut rx = pipeline.subscribe();

    // 发现请求不记录
    pipeline.refresh();
    settled(&mut rx).await;

    pipeline.set_search_text("batman");
    tokio::time::sleep(Duration::from_millis(600)).await;
    settled(&mut rx).await;
    tokio::task::yield_now().await;

    assert_eq!(metrics.calls(), vec![("batman".to_string(), 268)]);
}

#[tokio::test(start_paused = true)]
async fn test_analytics_failure_does_not_affect_outcome() {
    let catalog = FakeCatalog::echo();
    let metrics = RecordingMetrics::failing();
    let pipeline = pipeline(&catalog, Some(metrics.clone()));
    let mut rx = pipeline.subscribe();

    pipeline.set_search_text("up");
    tokio::time::sleep(Duration::from_millis(600)).await;
    let outcome = settled(&mut rx).await;
    tokio::task::yield_now().await;

    assert_eq!(outcome.movies().len(), 1);
    assert_eq!(metrics.calls().len(), 1);
    assert_eq!(pipeline.outcome(), outcome);
}

#[tokio::test(start_paused = true)]
async fn test_empty_search_is_not_recorded() {
    let catalog = FakeCatalog::new(|_| (Duration::ZERO, Ok(MoviePage::default())));
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = pipeline(&catalog, Some(metrics.clone()));
    let mut rx = pipeline.subscribe();

    pipeline.set_search_text("zzzz");
    tokio::time::sleep(Duration::from_millis(600)).await;
    settled(&mut rx).await;
    tokio::task::yield_now().await;

    assert!(metrics.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clear_filters_resets_state_exactly() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.toggle_genre(18);
    pipeline.set_sort(SortKey::TitleDesc);
    pipeline.set_view_mode(ViewMode::List);
    pipeline.set_search_text("pending text");
    settled(&mut rx).await;
    let before = catalog.requests().len();

    pipeline.clear_filters();
    assert_eq!(
        pipeline.filters(),
        FilterState {
            search_text: String::new(),
            selected_genre_ids: Vec::new(),
            sort_key: SortKey::PopularityDesc,
            view_mode: ViewMode::Grid,
        }
    );
    assert_eq!(pipeline.committed_search(), "");

    // 待提交的输入被取消，只发出一次请求
    tokio::time::sleep(Duration::from_millis(600)).await;
    settled(&mut rx).await;
    let requests = catalog.requests();
    assert_eq!(requests.len(), before + 1);
    assert_eq!(
        requests.last().unwrap().query_params(),
        vec![("sort_by", "popularity.desc".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_sort_and_view_mode_do_not_fetch() {
    let catalog = FakeCatalog::echo();
    let pipeline = pipeline(&catalog, None);

    assert_eq!(pipeline.set_sort(SortKey::PopularityDesc), None);
    pipeline.set_view_mode(ViewMode::List);
    tokio::task::yield_now().await;

    assert!(catalog.requests().is_empty());
    assert_eq!(pipeline.phase(), PipelinePhase::Idle);
    assert_eq!(pipeline.outcome(), QueryOutcome::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_retries_after_failure() {
    let catalog = FakeCatalog::new(|_| (Duration::ZERO, Err(http_error(503, "Service Unavailable"))));
    let pipeline = pipeline(&catalog, None);
    let mut rx = pipeline.subscribe();

    pipeline.refresh();
    assert!(matches!(settled(&mut rx).await, QueryOutcome::Failed(_)));

    catalog.respond_with(|_| (Duration::ZERO, Ok(MoviePage::with_results(vec![movie(7, "Se7en")]))));
    pipeline.refresh();
    assert_eq!(settled(&mut rx).await.movies()[0].id, 7);
    assert_eq!(pipeline.generation(), 2);
}
