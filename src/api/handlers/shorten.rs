//! Handler for the URL shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a shortened URL.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "key": "my-key" }
/// ```
///
/// `key` is optional. When absent the key is derived from a salted SHA-256
/// digest of the URL, retrying on conflicts.
///
/// # Response
///
/// ```json
/// {
///   "key": "ses3Vu",
///   "url": "https://example.com",
///   "short_url": "http://localhost:3000/ses3Vu"
/// }
/// ```
///
/// # Errors
///
/// - **400 Bad Request**: empty or oversized URL, key not exactly 6 characters
/// - **409 Conflict**: the requested key is already taken
/// - **503 Service Unavailable**: no free key found within the retry budget or deadline
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let cancel = state.shutdown.child_token();

    let created = match payload.key {
        Some(ref key) => {
            state
                .generation_service
                .generate_with_key(key, &payload.url, &cancel)
                .await?
        }
        None => {
            state
                .generation_service
                .generate(&payload.url, &cancel)
                .await?
        }
    };

    let short_url = state.short_url(&created.key);

    Ok(Json(ShortenResponse {
        key: created.key,
        url: created.target_url,
        short_url,
    }))
}
