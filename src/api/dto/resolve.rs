//! DTO for key lookups.

use serde::Serialize;

use crate::domain::entities::ShortenedUrl;

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub key: String,
    pub url: String,
}

impl From<ShortenedUrl> for ResolveResponse {
    fn from(entity: ShortenedUrl) -> Self {
        Self {
            key: entity.key,
            url: entity.target_url,
        }
    }
}
