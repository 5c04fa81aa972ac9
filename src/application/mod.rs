//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::UrlStore`] trait and
//! provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::GenerationService`] - Key generation with conflict retries and a deadline
//! - [`services::LookupService`] - Key lookup

pub mod services;
