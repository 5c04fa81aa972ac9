//! Infrastructure layer for external integrations.
//!
//! This layer implements the storage interface defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory [`crate::domain::repositories::UrlStore`] implementations

pub mod persistence;
