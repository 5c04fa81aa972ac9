//! Short key derivation and input validation.
//!
//! Keys are the first [`KEY_LENGTH`] characters of the URL-safe base64 encoding
//! of `hash(url || salt)`. A fresh salt per call makes two derivations for the
//! same URL diverge.

use crate::domain::errors::ShortenerError;
use crate::domain::limits::{KEY_LENGTH, TARGET_URL_MAX_LENGTH};
use crate::utils::hash::HashProvider;
use base64::Engine as _;

/// Derives a short key for `target_url` using `salt`.
///
/// # Examples
///
/// ```ignore
/// let key = derive_key("https://example.com", &[7u8; 64], &Sha256HashProvider);
/// assert_eq!(key, "ses3Vu");
/// ```
pub fn derive_key<H: HashProvider + ?Sized>(target_url: &str, salt: &[u8], hasher: &H) -> String {
    let mut input = Vec::with_capacity(target_url.len() + salt.len());
    input.extend_from_slice(target_url.as_bytes());
    input.extend_from_slice(salt);

    let digest = hasher.hash(&input);
    let mut key = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    key.truncate(KEY_LENGTH);
    key
}

/// Validates a target URL before generation.
///
/// # Rules
///
/// - Must not be empty or whitespace-only
/// - At most [`TARGET_URL_MAX_LENGTH`] characters
///
/// # Errors
///
/// Returns [`ShortenerError::Validation`] if any rule is violated.
pub fn validate_target_url(target_url: &str) -> Result<(), ShortenerError> {
    if target_url.trim().is_empty() {
        return Err(ShortenerError::validation(
            "url",
            "cannot be empty or whitespace",
        ));
    }

    let length = target_url.chars().count();
    if length > TARGET_URL_MAX_LENGTH {
        return Err(ShortenerError::validation(
            "url",
            format!("must be at most {TARGET_URL_MAX_LENGTH} characters, got {length}"),
        ));
    }

    Ok(())
}

/// Validates a caller-supplied key.
///
/// # Rules
///
/// - Must not be empty or whitespace-only
/// - Exactly [`KEY_LENGTH`] characters
///
/// # Errors
///
/// Returns [`ShortenerError::Validation`] if any rule is violated.
pub fn validate_key(key: &str) -> Result<(), ShortenerError> {
    if key.trim().is_empty() {
        return Err(ShortenerError::validation(
            "key",
            "cannot be empty or whitespace",
        ));
    }

    let length = key.chars().count();
    if length != KEY_LENGTH {
        return Err(ShortenerError::validation(
            "key",
            format!("must be exactly {KEY_LENGTH} characters, got {length}"),
        ));
    }

    Ok(())
}
