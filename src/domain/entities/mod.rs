//! Core domain entities.
//!
//! The shortener has a single entity, [`ShortenedUrl`]. It is a plain value
//! without behaviour; generation and lookup live in
//! [`crate::application::services`].

pub mod shortened_url;

pub use shortened_url::ShortenedUrl;
