#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use hash_shortener::application::services::GenerationOptions;
use hash_shortener::domain::repositories::UrlStore;
use hash_shortener::infrastructure::persistence::InMemoryUrlStore;
use hash_shortener::routes::router;
use hash_shortener::state::AppState;
use tokio_util::sync::CancellationToken;

pub const BASE_URL: &str = "https://s.test.com";

pub fn create_test_state() -> (AppState, Arc<InMemoryUrlStore>) {
    let store = Arc::new(InMemoryUrlStore::new());
    let options = GenerationOptions::new(3, Duration::from_secs(2)).unwrap();

    let state = AppState::new(store.clone(), options, BASE_URL, CancellationToken::new());

    (state, store)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

pub async fn create_test_url(store: &InMemoryUrlStore, key: &str, url: &str) {
    store
        .create(key, url, &CancellationToken::new())
        .await
        .unwrap();
}
