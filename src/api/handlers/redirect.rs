//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its target URL.
///
/// # Endpoint
///
/// `GET /{key}`
///
/// Responds with 307 Temporary Redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the key is unknown.
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let cancel = state.shutdown.child_token();
    let entity = state.lookup_service.get(&key, &cancel).await?;

    debug!("Redirecting {} to {}", entity.key, entity.target_url);

    Ok(Redirect::temporary(&entity.target_url))
}
