//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST /urls`        - Create a short URL (generated or explicit key)
/// - `GET  /urls/{key}`  - Look up the mapping for a key
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(shorten_handler))
        .route("/urls/{key}", get(resolve_handler))
}
