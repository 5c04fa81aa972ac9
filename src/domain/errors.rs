//! Failure taxonomy of the generation and lookup services.
//!
//! Only two outcomes are wrapped: key conflicts that outlive the retry budget
//! and an expired generation deadline. Both become
//! [`ShortenerError::CantCreate`] with the original cause attached. Every other
//! failure reaches the caller as it was produced.

use crate::domain::repositories::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`crate::application::services`].
#[derive(Debug, Error)]
pub enum ShortenerError {
    /// Malformed input, detected before any salt, hash or store call.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Automatic key generation gave up.
    #[error("the short URL for '{url}' can't be created")]
    CantCreate {
        url: String,
        #[source]
        source: GenerationFailure,
    },

    /// No mapping exists for the key.
    #[error("short URL with key '{0}' not found")]
    NotFound(String),

    /// The caller's cancellation token fired.
    #[error("operation was cancelled")]
    Cancelled,

    /// A store error passed through untouched, including explicit-key conflicts.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShortenerError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns true if the error is a store-reported key conflict.
    ///
    /// Only the explicit-key path surfaces conflicts this way; the automatic
    /// path wraps them in [`ShortenerError::CantCreate`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conflict())
    }
}

/// Cause attached to [`ShortenerError::CantCreate`].
#[derive(Debug, Error)]
pub enum GenerationFailure {
    /// Every attempt hit an existing key. Holds the last conflict.
    #[error("key conflicts persisted after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The cumulative deadline passed before a key was stored.
    #[error("generation did not finish within {0:?}")]
    TimedOut(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_cant_create_exposes_cause_chain() {
        let err = ShortenerError::CantCreate {
            url: "https://example.com".to_string(),
            source: GenerationFailure::RetriesExhausted {
                attempts: 4,
                source: StoreError::conflict("abcdef"),
            },
        };

        assert_eq!(
            err.to_string(),
            "the short URL for 'https://example.com' can't be created"
        );

        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "key conflicts persisted after 4 attempts");

        let root = cause.source().unwrap();
        assert_eq!(root.to_string(), "short URL key 'abcdef' is already used");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = ShortenerError::from(StoreError::conflict("abcdef"));

        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "short URL key 'abcdef' is already used");
    }

    #[test]
    fn test_validation_message() {
        let err = ShortenerError::validation("url", "cannot be empty or whitespace");

        assert_eq!(err.to_string(), "invalid url: cannot be empty or whitespace");
        assert!(!err.is_conflict());
    }
}
