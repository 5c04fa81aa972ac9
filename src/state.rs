//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::services::{GenerationOptions, GenerationService, LookupService};
use crate::domain::repositories::UrlStore;
use crate::utils::hash::Sha256HashProvider;
use crate::utils::salt::RngSaltProvider;

/// Generation service as wired by the server: SHA-256 digests, OS entropy salts.
pub type UrlGenerationService = GenerationService<dyn UrlStore, Sha256HashProvider, RngSaltProvider>;

pub type UrlLookupService = LookupService<dyn UrlStore>;

#[derive(Clone)]
pub struct AppState {
    pub generation_service: Arc<UrlGenerationService>,
    pub lookup_service: Arc<UrlLookupService>,
    /// Prefix used to render `short_url` in responses.
    pub base_url: Arc<str>,
    /// Cancelled on shutdown; each request works on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wires both services over one store.
    pub fn new(
        store: Arc<dyn UrlStore>,
        options: GenerationOptions,
        base_url: &str,
        shutdown: CancellationToken,
    ) -> Self {
        let generation_service = GenerationService::new(
            store.clone(),
            Arc::new(Sha256HashProvider),
            Arc::new(RngSaltProvider::new()),
            options,
        );

        Self {
            generation_service: Arc::new(generation_service),
            lookup_service: Arc::new(LookupService::new(store)),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            shutdown,
        }
    }

    /// Full short URL for `key`.
    pub fn short_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
