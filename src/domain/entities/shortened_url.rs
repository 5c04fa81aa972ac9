//! Shortened URL entity: a short key mapped to its target URL.

use serde::Serialize;

/// A short key together with the URL it resolves to.
///
/// Values are created once, at generation time, and never mutated. Key
/// uniqueness is a property of the backing store, not of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenedUrl {
    pub key: String,
    pub target_url: String,
}

impl ShortenedUrl {
    /// Creates a new ShortenedUrl instance.
    pub fn new(key: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target_url: target_url.into(),
        }
    }
}
