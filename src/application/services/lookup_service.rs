//! Short key lookup.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::entities::ShortenedUrl;
use crate::domain::errors::ShortenerError;
use crate::domain::repositories::{StoreError, UrlStore};

/// Read path over the [`UrlStore`]. One store call per lookup, no retries.
pub struct LookupService<S: UrlStore + ?Sized> {
    store: Arc<S>,
}

impl<S: UrlStore + ?Sized> LookupService<S> {
    /// Creates a new lookup service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Retrieves the mapping stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::NotFound`] if no mapping exists.
    /// Returns [`ShortenerError::Cancelled`] if `cancel` fires first.
    /// Store failures are returned unwrapped as [`ShortenerError::Store`].
    pub async fn get(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<ShortenedUrl, ShortenerError> {
        if cancel.is_cancelled() {
            return Err(ShortenerError::Cancelled);
        }

        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ShortenerError::Cancelled),
            found = self.store.read(key) => found,
        };

        match found {
            Ok(Some(url)) => Ok(url),
            Ok(None) => {
                debug!("No short URL stored under key {}", key);
                Err(ShortenerError::NotFound(key.to_string()))
            }
            Err(StoreError::Cancelled) => Err(ShortenerError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks that the backing store is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
