//! Random salt for key derivation.

use rand::TryRngCore;
use rand::rngs::OsRng;
use std::sync::OnceLock;
use tracing::debug;

/// Number of salt bytes mixed into every key derivation.
pub const SALT_LENGTH: usize = 64;

/// Salt bytes for a single derivation.
pub type Salt = [u8; SALT_LENGTH];

/// Source of unpredictable bytes, one fresh salt per call.
#[cfg_attr(test, mockall::automock)]
pub trait SaltProvider: Send + Sync {
    fn get_salt(&self) -> Salt;
}

/// Salt provider backed by the operating system CSPRNG.
///
/// The generator handle is created on the first [`SaltProvider::get_salt`]
/// call and reused afterwards. It is never mutated, so concurrent callers
/// share it without locking.
#[derive(Debug, Default)]
pub struct RngSaltProvider {
    rng: OnceLock<OsRng>,
}

impl RngSaltProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn rng(&self) -> OsRng {
        *self.rng.get_or_init(|| {
            debug!("Initializing OS entropy source for salts");
            OsRng
        })
    }
}

impl SaltProvider for RngSaltProvider {
    /// # Panics
    ///
    /// Panics if the system random number generator fails. There is no
    /// sensible way to keep generating keys without entropy.
    fn get_salt(&self) -> Salt {
        let mut salt = [0u8; SALT_LENGTH];

        self.rng()
            .try_fill_bytes(&mut salt)
            .expect("OS random number generator failed");

        salt
    }
}
