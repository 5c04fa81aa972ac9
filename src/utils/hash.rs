//! Digest function used by key derivation.

use sha2::{Digest as _, Sha256};

/// Size of the digest produced by [`HashProvider::hash`].
pub const DIGEST_LENGTH: usize = 32;

/// Fixed-size digest.
pub type Digest = [u8; DIGEST_LENGTH];

/// Deterministic one-way hash of arbitrary bytes.
#[cfg_attr(test, mockall::automock)]
pub trait HashProvider: Send + Sync {
    fn hash(&self, input: &[u8]) -> Digest;
}

/// SHA-256 implementation of [`HashProvider`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256HashProvider;

impl HashProvider for Sha256HashProvider {
    fn hash(&self, input: &[u8]) -> Digest {
        let mut digest = [0u8; DIGEST_LENGTH];
        digest.copy_from_slice(&Sha256::digest(input));
        digest
    }
}
