//! Storage contract for shortened URLs.

use crate::domain::entities::ShortenedUrl;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Boxed error carried as the underlying cause of a store failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a [`UrlStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is already mapped to some URL.
    #[error("short URL key '{key}' is already used")]
    UniquenessConflict {
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The store observed the cancellation token and abandoned the call.
    #[error("storage operation was cancelled")]
    Cancelled,

    /// Anything the store could not classify.
    #[error("storage operation failed: {0}")]
    Other(#[source] BoxError),
}

impl StoreError {
    /// Builds a conflict error for `key` without an underlying cause.
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::UniquenessConflict {
            key: key.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error as an unclassified store failure.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Returns true for [`StoreError::UniquenessConflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UniquenessConflict { .. })
    }
}

/// Persists and looks up `(key, URL)` pairs.
///
/// Key uniqueness is enforced here and nowhere else: the generation pipeline
/// holds no lock over the store and relies on [`StoreError::UniquenessConflict`]
/// as the only trustworthy collision signal.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlStore`] - process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Inserts a new mapping.
    ///
    /// Implementations that can abort an in-flight write should observe
    /// `cancel` and return [`StoreError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniquenessConflict`] if `key` already exists.
    /// Returns [`StoreError::Other`] on any other storage failure.
    async fn create(
        &self,
        key: &str,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;

    /// Finds the mapping for `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortenedUrl))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Other`] on storage failures.
    async fn read(&self, key: &str) -> Result<Option<ShortenedUrl>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
