//! Repository trait definitions for the domain layer.
//!
//! The domain consumes storage only through [`UrlStore`]. Concrete stores live
//! in `crate::infrastructure::persistence`; a `mockall` mock is generated for
//! unit tests.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_url.rs` for the Postgres store.

pub mod url_store;

pub use url_store::{BoxError, StoreError, UrlStore};

#[cfg(test)]
pub use url_store::MockUrlStore;
