//! Short URL generation with conflict retries and a cumulative deadline.

use std::sync::Arc;

use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::generation_options::GenerationOptions;
use crate::domain::entities::ShortenedUrl;
use crate::domain::errors::{GenerationFailure, ShortenerError};
use crate::domain::repositories::{StoreError, UrlStore};
use crate::utils::code_generator::{derive_key, validate_key, validate_target_url};
use crate::utils::hash::HashProvider;
use crate::utils::salt::SaltProvider;

/// Service that creates shortened URLs.
///
/// Automatic generation derives a salted hash key and tries to store it. A key
/// conflict reported by the store triggers a new attempt with fresh salt, up to
/// [`GenerationOptions::retry_count`] retries. All attempts share one deadline
/// of [`GenerationOptions::timeout`], captured before the first attempt; a slow
/// store can therefore use up the deadline before the retries run out.
///
/// The service holds no lock over the store. Two concurrent calls may derive
/// the same key; the store's uniqueness check decides which one wins and the
/// loser retries.
pub struct GenerationService<S: UrlStore + ?Sized, H: HashProvider, P: SaltProvider> {
    store: Arc<S>,
    hash_provider: Arc<H>,
    salt_provider: Arc<P>,
    options: GenerationOptions,
}

impl<S: UrlStore + ?Sized, H: HashProvider, P: SaltProvider> GenerationService<S, H, P> {
    /// Creates a new generation service.
    pub fn new(
        store: Arc<S>,
        hash_provider: Arc<H>,
        salt_provider: Arc<P>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            store,
            hash_provider,
            salt_provider,
            options,
        }
    }

    /// Generates a key for `target_url` and stores the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Validation`] if the URL is blank or too long.
    /// No salt, hash or store call is made in that case.
    ///
    /// Returns [`ShortenerError::CantCreate`] if every attempt conflicted or the
    /// deadline passed, with the cause attached.
    ///
    /// Returns [`ShortenerError::Cancelled`] if `cancel` fires.
    ///
    /// Any other store failure is returned as [`ShortenerError::Store`] after
    /// the attempt that produced it, without retrying.
    pub async fn generate(
        &self,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ShortenedUrl, ShortenerError> {
        validate_target_url(target_url)?;

        let timeout = self.options.timeout();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            warn!("Deadline of {:?} is out of range", timeout);
            return Err(timed_out(target_url, timeout));
        };
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ShortenerError::Cancelled);
            }

            if Instant::now() >= deadline {
                warn!("Deadline of {:?} passed after {} attempts", timeout, attempt);
                return Err(timed_out(target_url, timeout));
            }

            attempt += 1;
            let key = self.next_key(target_url);
            debug!(attempt, key = %key, "Storing generated key");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ShortenerError::Cancelled),
                outcome = timeout_at(deadline, self.store.create(&key, target_url, cancel)) => outcome,
            };

            let Ok(created) = outcome else {
                warn!(
                    "Deadline of {:?} passed while storing key {} (attempt {})",
                    timeout, key, attempt
                );
                return Err(timed_out(target_url, timeout));
            };

            match created {
                Ok(()) => {
                    debug!(attempt, key = %key, "Generated key stored");
                    return Ok(ShortenedUrl::new(key, target_url));
                }
                Err(conflict @ StoreError::UniquenessConflict { .. }) => {
                    if attempt <= self.options.retry_count() {
                        warn!(
                            "Key {} already used (attempt {}/{}), retrying",
                            key,
                            attempt,
                            self.options.retry_count().saturating_add(1)
                        );
                        continue;
                    }

                    warn!("Key conflicts persisted after {} attempts", attempt);
                    return Err(ShortenerError::CantCreate {
                        url: target_url.to_string(),
                        source: GenerationFailure::RetriesExhausted {
                            attempts: attempt,
                            source: conflict,
                        },
                    });
                }
                Err(StoreError::Cancelled) => return Err(ShortenerError::Cancelled),
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Stores `target_url` under a caller-chosen key.
    ///
    /// Makes exactly one store call. A conflict is not retried because a new
    /// key would silently ignore the caller's choice.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::Validation`] if the key is blank or not
    /// exactly six characters, or the URL is invalid.
    ///
    /// Store errors, conflicts included, are returned unwrapped as
    /// [`ShortenerError::Store`].
    pub async fn generate_with_key(
        &self,
        key: &str,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<ShortenedUrl, ShortenerError> {
        validate_key(key)?;
        validate_target_url(target_url)?;

        if cancel.is_cancelled() {
            return Err(ShortenerError::Cancelled);
        }

        match self.store.create(key, target_url, cancel).await {
            Ok(()) => Ok(ShortenedUrl::new(key, target_url)),
            Err(StoreError::Cancelled) => Err(ShortenerError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    fn next_key(&self, target_url: &str) -> String {
        let salt = self.salt_provider.get_salt();
        derive_key(target_url, &salt, self.hash_provider.as_ref())
    }
}

fn timed_out(target_url: &str, timeout: std::time::Duration) -> ShortenerError {
    ShortenerError::CantCreate {
        url: target_url.to_string(),
        source: GenerationFailure::TimedOut(timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::generation_options::MAX_TIMEOUT;
    use crate::domain::limits::KEY_LENGTH;
    use crate::domain::repositories::MockUrlStore;
    use crate::infrastructure::persistence::InMemoryUrlStore;
    use crate::utils::hash::{DIGEST_LENGTH, MockHashProvider, Sha256HashProvider};
    use crate::utils::salt::{MockSaltProvider, RngSaltProvider, SALT_LENGTH};
    use async_trait::async_trait;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn options(retry_count: u32) -> GenerationOptions {
        GenerationOptions::new(retry_count, Duration::from_secs(2)).unwrap()
    }

    /// Salt provider whose n-th salt is filled with byte `n`.
    fn counting_salts(times: usize) -> MockSaltProvider {
        let mut salts = MockSaltProvider::new();
        let mut n = 0u8;
        salts.expect_get_salt().times(times).returning(move || {
            n += 1;
            [n; SALT_LENGTH]
        });
        salts
    }

    /// Hash provider that puts the last input byte first, so salt `n` maps to a
    /// predictable key.
    fn echo_hasher(times: usize) -> MockHashProvider {
        let mut hasher = MockHashProvider::new();
        hasher
            .expect_hash()
            .times(times)
            .returning(|input: &[u8]| {
                let mut digest = [0u8; DIGEST_LENGTH];
                digest[0] = input[input.len() - 1];
                digest
            });
        hasher
    }

    fn idle_providers() -> (MockHashProvider, MockSaltProvider) {
        let mut hasher = MockHashProvider::new();
        hasher.expect_hash().times(0);
        let mut salts = MockSaltProvider::new();
        salts.expect_get_salt().times(0);
        (hasher, salts)
    }

    fn build(
        store: MockUrlStore,
        hasher: MockHashProvider,
        salts: MockSaltProvider,
        options: GenerationOptions,
    ) -> GenerationService<MockUrlStore, MockHashProvider, MockSaltProvider> {
        GenerationService::new(
            Arc::new(store),
            Arc::new(hasher),
            Arc::new(salts),
            options,
        )
    }

    #[tokio::test]
    async fn test_generate_success_first_attempt() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .withf(|key, url, _| key == "AQAAAA" && url == "https://example.com")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = build(mock_store, echo_hasher(1), counting_salts(1), options(3));

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(result.is_ok());
        let url = result.unwrap();
        assert_eq!(url.key, "AQAAAA");
        assert_eq!(url.key.len(), KEY_LENGTH);
        assert_eq!(url.target_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_generate_with_real_providers() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = GenerationService::new(
            Arc::new(mock_store),
            Arc::new(Sha256HashProvider),
            Arc::new(RngSaltProvider::new()),
            GenerationOptions::default(),
        );

        let url = service
            .generate("https://example.com", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url.key.chars().count(), KEY_LENGTH);
        assert!(
            url.key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_url_without_side_effects() {
        for url in ["", "   ", "\t\n"] {
            let mut mock_store = MockUrlStore::new();
            mock_store.expect_create().times(0);
            let (hasher, salts) = idle_providers();

            let service = build(mock_store, hasher, salts, options(3));

            let result = service.generate(url, &CancellationToken::new()).await;

            assert!(matches!(
                result,
                Err(ShortenerError::Validation { field: "url", .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_too_long_url_without_side_effects() {
        let mut mock_store = MockUrlStore::new();
        mock_store.expect_create().times(0);
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));
        let url = format!("https://example.com/{}", "a".repeat(2000));

        let result = service.generate(&url, &CancellationToken::new()).await;

        assert!(matches!(result, Err(ShortenerError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_generate_retries_conflicts_then_succeeds() {
        let mut mock_store = MockUrlStore::new();
        let mut calls = 0;
        mock_store
            .expect_create()
            .times(4)
            .returning(move |key, _, _| {
                calls += 1;
                if calls <= 3 {
                    Err(StoreError::conflict(key))
                } else {
                    Ok(())
                }
            });

        let service = build(mock_store, echo_hasher(4), counting_salts(4), options(3));

        let url = service
            .generate("https://example.com", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url.key, "BAAAAA");
        assert_eq!(url.target_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_generate_uses_fresh_key_per_attempt() {
        let mut mock_store = MockUrlStore::new();
        let mut seen = Vec::new();
        mock_store
            .expect_create()
            .times(3)
            .returning(move |key, _, _| {
                assert!(!seen.contains(&key.to_string()), "key {key} reused");
                seen.push(key.to_string());
                if seen.len() < 3 {
                    Err(StoreError::conflict(key))
                } else {
                    Ok(())
                }
            });

        let service = build(mock_store, echo_hasher(3), counting_salts(3), options(5));

        let url = service
            .generate("https://example.com", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url.key, "AwAAAA");
    }

    #[tokio::test]
    async fn test_generate_exhausted_retries_wraps_last_conflict() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(4)
            .returning(|key, _, _| Err(StoreError::conflict(key)));

        let service = build(mock_store, echo_hasher(4), counting_salts(4), options(3));

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        match result {
            Err(ShortenerError::CantCreate {
                url,
                source:
                    GenerationFailure::RetriesExhausted {
                        attempts,
                        source: StoreError::UniquenessConflict { key, .. },
                    },
            }) => {
                assert_eq!(url, "https://example.com");
                assert_eq!(attempts, 4);
                assert_eq!(key, "BAAAAA");
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_zero_retries_makes_single_attempt() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|key, _, _| Err(StoreError::conflict(key)));

        let service = build(mock_store, echo_hasher(1), counting_salts(1), options(0));

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ShortenerError::CantCreate {
                source: GenerationFailure::RetriesExhausted { attempts: 1, .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_generate_propagates_other_store_errors_without_retry() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|_, _, _| Err(StoreError::other(io::Error::other("disk full"))));

        let service = build(mock_store, echo_hasher(1), counting_salts(1), options(3));

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ShortenerError::Store(StoreError::Other(_))));
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_generate_cancelled_before_first_attempt() {
        let mut mock_store = MockUrlStore::new();
        mock_store.expect_create().times(0);
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = service.generate("https://example.com", &cancel).await;

        assert!(matches!(result, Err(ShortenerError::Cancelled)));
    }

    #[tokio::test]
    async fn test_generate_store_reported_cancellation() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Cancelled));

        let service = build(mock_store, echo_hasher(1), counting_salts(1), options(3));

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ShortenerError::Cancelled)));
    }

    #[tokio::test]
    async fn test_generate_with_key_success() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .withf(|key, url, _| key == "abcdef" && url == "https://x.com")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));

        let url = service
            .generate_with_key("abcdef", "https://x.com", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url, ShortenedUrl::new("abcdef", "https://x.com"));
    }

    #[tokio::test]
    async fn test_generate_with_key_conflict_is_not_retried_or_wrapped() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|key, _, _| Err(StoreError::conflict(key)));
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));

        let result = service
            .generate_with_key("abcdef", "https://x.com", &CancellationToken::new())
            .await;

        let err = result.unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(
            err,
            ShortenerError::Store(StoreError::UniquenessConflict { ref key, .. }) if key == "abcdef"
        ));
    }

    #[tokio::test]
    async fn test_generate_with_key_propagates_other_errors() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|_, _, _| Err(StoreError::other(io::Error::other("connection reset"))));
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));

        let result = service
            .generate_with_key("abcdef", "https://x.com", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ShortenerError::Store(StoreError::Other(_)))
        ));
    }

    #[tokio::test]
    async fn test_generate_with_key_rejects_invalid_key_without_side_effects() {
        for key in ["", "      ", "abc", "abcdefg"] {
            let mut mock_store = MockUrlStore::new();
            mock_store.expect_create().times(0);
            let (hasher, salts) = idle_providers();

            let service = build(mock_store, hasher, salts, options(3));

            let result = service
                .generate_with_key(key, "https://x.com", &CancellationToken::new())
                .await;

            assert!(
                matches!(result, Err(ShortenerError::Validation { field: "key", .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_generate_with_key_rejects_blank_url_without_side_effects() {
        let mut mock_store = MockUrlStore::new();
        mock_store.expect_create().times(0);
        let (hasher, salts) = idle_providers();

        let service = build(mock_store, hasher, salts, options(3));

        let result = service
            .generate_with_key("abcdef", "  ", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ShortenerError::Validation { field: "url", .. })
        ));
    }

    /// Store whose `create` takes `delay` and then succeeds or conflicts.
    struct SlowStore {
        delay: Duration,
        conflict: bool,
        calls: AtomicUsize,
    }

    impl SlowStore {
        fn new(delay: Duration, conflict: bool) -> Self {
            Self {
                delay,
                conflict,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UrlStore for SlowStore {
        async fn create(
            &self,
            key: &str,
            _target_url: &str,
            _cancel: &CancellationToken,
        ) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;

            if self.conflict {
                Err(StoreError::conflict(key))
            } else {
                Ok(())
            }
        }

        async fn read(&self, _key: &str) -> Result<Option<ShortenedUrl>, StoreError> {
            Ok(None)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn slow_service(
        store: Arc<SlowStore>,
        retry_count: u32,
    ) -> GenerationService<SlowStore, Sha256HashProvider, RngSaltProvider> {
        GenerationService::new(
            store,
            Arc::new(Sha256HashProvider),
            Arc::new(RngSaltProvider::new()),
            options(retry_count),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_times_out_on_blocked_store() {
        let store = Arc::new(SlowStore::new(Duration::from_secs(60), false));
        let service = slow_service(store.clone(), 3);

        let started = Instant::now();
        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;
        let elapsed = started.elapsed();

        assert!(matches!(
            result,
            Err(ShortenerError::CantCreate {
                source: GenerationFailure::TimedOut(timeout),
                ..
            }) if timeout == Duration::from_secs(2)
        ));
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_cumulative_across_attempts() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(600), true));
        let service = slow_service(store.clone(), 10);

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ShortenerError::CantCreate {
                source: GenerationFailure::TimedOut(_),
                ..
            })
        ));
        assert_eq!(store.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_within_deadline_succeeds() {
        let store = Arc::new(SlowStore::new(Duration::from_secs(1), false));
        let service = slow_service(store.clone(), 3);

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_pending_attempt() {
        let store = Arc::new(SlowStore::new(Duration::from_secs(60), false));
        let service = GenerationService::new(
            store.clone(),
            Arc::new(Sha256HashProvider),
            Arc::new(RngSaltProvider::new()),
            GenerationOptions::new(3, Duration::from_secs(120)).unwrap(),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = service.generate("https://example.com", &cancel).await;

        assert!(matches!(result, Err(ShortenerError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_retries_log_conflict_without_overflow() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut mock_store = MockUrlStore::new();
        let mut calls = 0;
        mock_store
            .expect_create()
            .times(2)
            .returning(move |key, _, _| {
                calls += 1;
                if calls == 1 {
                    Err(StoreError::conflict(key))
                } else {
                    Ok(())
                }
            });

        let service = build(
            mock_store,
            echo_hasher(2),
            counting_salts(2),
            GenerationOptions::new(u32::MAX, Duration::from_secs(2)).unwrap(),
        );

        let url = service
            .generate("https://example.com", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url.key, "AgAAAA");
    }

    #[tokio::test]
    async fn test_longest_allowed_timeout_generates() {
        let mut mock_store = MockUrlStore::new();
        mock_store
            .expect_create()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = build(
            mock_store,
            echo_hasher(1),
            counting_salts(1),
            GenerationOptions::new(3, MAX_TIMEOUT).unwrap(),
        );

        let result = service
            .generate("https://example.com", &CancellationToken::new())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_generators_race_on_store_uniqueness() {
        let store = Arc::new(InMemoryUrlStore::new());

        let fixed_salts = || {
            let mut salts = MockSaltProvider::new();
            salts.expect_get_salt().returning(|| [42u8; SALT_LENGTH]);
            Arc::new(salts)
        };

        let first = GenerationService::new(
            store.clone(),
            Arc::new(Sha256HashProvider),
            fixed_salts(),
            options(0),
        );
        let second = GenerationService::new(
            store.clone(),
            Arc::new(Sha256HashProvider),
            fixed_salts(),
            options(0),
        );

        let cancel = CancellationToken::new();
        let (a, b) = tokio::join!(
            first.generate("https://example.com", &cancel),
            second.generate("https://example.com", &cancel)
        );

        let outcomes = [a, b];
        let stored = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(ShortenerError::CantCreate {
                        source: GenerationFailure::RetriesExhausted { .. },
                        ..
                    })
                )
            })
            .count();

        assert_eq!(stored, 1);
        assert_eq!(rejected, 1);
    }
}
