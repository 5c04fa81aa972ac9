//! PostgreSQL implementation of the URL store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::ShortenedUrl;
use crate::domain::repositories::{StoreError, UrlStore};
use crate::utils::db_error::classify_insert_error;

/// PostgreSQL store for shortened URLs.
///
/// Key uniqueness comes from the primary key on `shortened_urls.short_url_key`;
/// a violation (SQLSTATE 23505) is reported as
/// [`StoreError::UniquenessConflict`].
pub struct PgUrlStore {
    pool: Arc<PgPool>,
}

impl PgUrlStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlStore for PgUrlStore {
    async fn create(
        &self,
        key: &str,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let insert = sqlx::query(
            r#"
            INSERT INTO shortened_urls (short_url_key, actual_url)
            VALUES ($1, $2)
            "#,
        )
        .bind(key)
        .bind(target_url)
        .execute(self.pool.as_ref());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            result = insert => result
                .map(|_| ())
                .map_err(|e| classify_insert_error(e, key)),
        }
    }

    async fn read(&self, key: &str) -> Result<Option<ShortenedUrl>, StoreError> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT short_url_key, actual_url
            FROM shortened_urls
            WHERE short_url_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(StoreError::other)?;

        Ok(row.map(|(key, url)| ShortenedUrl::new(key, url)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(StoreError::other)
    }
}
