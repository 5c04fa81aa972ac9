//! Handler for key lookups.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the mapping stored under a key.
///
/// # Endpoint
///
/// `GET /api/urls/{key}`
///
/// # Errors
///
/// Returns 404 Not Found if the key is unknown.
pub async fn resolve_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let cancel = state.shutdown.child_token();
    let entity = state.lookup_service.get(&key, &cancel).await?;

    Ok(Json(entity.into()))
}
