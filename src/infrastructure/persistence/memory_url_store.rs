//! Process-local URL store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::ShortenedUrl;
use crate::domain::repositories::{StoreError, UrlStore};

/// In-memory implementation of [`UrlStore`] using DashMap.
///
/// Check-and-insert goes through the entry API, which holds the shard lock for
/// the key, so concurrent creates of the same key see exactly one winner.
/// Contents are lost on restart; used when no database is configured and in
/// tests.
#[derive(Debug, Default)]
pub struct InMemoryUrlStore {
    storage: DashMap<String, String>,
}

impl InMemoryUrlStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl UrlStore for InMemoryUrlStore {
    async fn create(
        &self,
        key: &str,
        target_url: &str,
        _cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        match self.storage.entry(key.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::conflict(key)),
            Entry::Vacant(slot) => {
                slot.insert(target_url.to_owned());
                Ok(())
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Option<ShortenedUrl>, StoreError> {
        Ok(self
            .storage
            .get(key)
            .map(|url| ShortenedUrl::new(key, url.value().as_str())))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
