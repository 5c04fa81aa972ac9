//! Domain layer containing the entity, storage contract and error taxonomy.
//!
//! # Architecture
//!
//! - [`entities`] - The [`entities::ShortenedUrl`] value type
//! - [`repositories`] - The [`repositories::UrlStore`] trait and its errors
//! - [`errors`] - [`errors::ShortenerError`] returned by the services
//! - [`limits`] - Key and URL length constants
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Key uniqueness is arbitrated by the store alone; no in-process lock exists
//! - Generation logic lives in [`crate::application::services`]

pub mod entities;
pub mod errors;
pub mod limits;
pub mod repositories;
