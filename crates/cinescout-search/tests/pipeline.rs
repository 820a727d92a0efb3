//! End-to-end: typed input through the debouncer, a wiremock TMDB, and the
//! trending aggregator backed by the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use cinescout_search::{QueryController, SearchSettings, SearchState};
use cinescout_tmdb::{MovieCatalog, TmdbClient};
use cinescout_trending::{MemoryStore, TrendingAggregator, TrendingStore};
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

struct Pipeline {
    controller: QueryController,
    store: Arc<MemoryStore>,
    rx: watch::Receiver<SearchState>,
}

fn pipeline(server: &MockServer) -> Pipeline {
    let client = TmdbClient::with_base_url("test-key", 5, &format!("{}/3", server.uri()))
        .expect("client construction should not fail");
    let catalog: Arc<dyn MovieCatalog> = Arc::new(client);

    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn TrendingStore> = Arc::clone(&store) as Arc<dyn TrendingStore>;
    let trending = Arc::new(TrendingAggregator::new(dyn_store, IMAGE_BASE));

    let settings = SearchSettings {
        debounce: Duration::from_millis(50),
        trending_limit: 5,
    };
    let controller = QueryController::new(catalog, trending, settings);
    let rx = controller.subscribe();
    Pipeline {
        controller,
        store,
        rx,
    }
}

async fn wait_for(
    rx: &mut watch::Receiver<SearchState>,
    predicate: impl FnMut(&SearchState) -> bool,
) -> SearchState {
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("state sender dropped")
        .clone()
}

async fn mount_tmdb(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [{ "id": 10, "title": "Popular", "poster_path": "/p.jpg" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "batman"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                { "id": 1, "title": "Batman", "poster_path": "/x.jpg" },
                { "id": 2, "title": "Batman Returns", "poster_path": "/y.jpg" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn typed_search_lands_results_and_counts_a_trending_hit() {
    let server = MockServer::start().await;
    mount_tmdb(&server).await;
    let mut p = pipeline(&server);

    let _driver = p.controller.mount();
    let state = wait_for(&mut p.rx, |s| !s.loading && s.generation == 1).await;
    assert_eq!(state.movies[0].title, "Popular");

    for text in ["b", "bat", "batman"] {
        p.controller.set_input(text);
    }

    let state = wait_for(&mut p.rx, |s| {
        s.settled_query.as_deref() == Some("batman") && !s.loading
    })
    .await;
    assert_eq!(state.movies.len(), 2);
    assert!(state.error_message.is_none());

    let state = wait_for(&mut p.rx, |s| !s.trending.is_empty()).await;
    let entry = &state.trending[0];
    assert_eq!(entry.movie_id, 1);
    assert_eq!(entry.search_count, 1);
    assert_eq!(
        entry.poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/x.jpg")
    );
    assert!(
        state.trending.iter().all(|e| e.movie_id != 10),
        "browsing must not count as a hit"
    );
}

#[tokio::test]
async fn repeating_a_search_increments_the_same_entry() {
    let server = MockServer::start().await;
    mount_tmdb(&server).await;
    let mut p = pipeline(&server);

    let first = p.controller.submit("batman");
    wait_for(&mut p.rx, |s| s.generation == first && !s.loading).await;
    wait_for(&mut p.rx, |s| {
        s.trending.first().is_some_and(|e| e.search_count == 1)
    })
    .await;

    let second = p.controller.submit("  batman ");
    wait_for(&mut p.rx, |s| s.generation == second && !s.loading).await;
    let state = wait_for(&mut p.rx, |s| {
        s.trending.first().is_some_and(|e| e.search_count == 2)
    })
    .await;

    assert_eq!(state.trending.len(), 1);
    assert_eq!(p.store.count_for_movie(1), 1);
}

#[tokio::test]
async fn tmdb_outage_shows_retry_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let mut p = pipeline(&server);

    let generation = p.controller.submit("batman");
    let state = wait_for(&mut p.rx, |s| s.generation == generation && !s.loading).await;

    assert!(state.movies.is_empty());
    assert_eq!(
        state.error_message.as_deref(),
        Some(cinescout_search::FETCH_FAILED_MESSAGE)
    );
    assert!(p.store.entries().is_empty());
}
