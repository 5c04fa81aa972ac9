use crate::domain::repositories::StoreError;

/// Returns true if `e` is a Postgres unique violation (SQLSTATE 23505).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation()
}

/// Classifies an insert failure for `key` into a [`StoreError`].
pub fn classify_insert_error(e: sqlx::Error, key: &str) -> StoreError {
    if is_unique_violation(&e) {
        return StoreError::UniquenessConflict {
            key: key.to_string(),
            source: Some(Box::new(e)),
        };
    }

    StoreError::other(e)
}
