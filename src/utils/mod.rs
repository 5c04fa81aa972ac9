//! Utility functions for key generation and storage error handling.
//!
//! - [`salt`] - Salt providers (OS entropy)
//! - [`hash`] - Digest providers (SHA-256)
//! - [`code_generator`] - Key derivation and input validation
//! - [`db_error`] - Postgres error classification

pub mod code_generator;
pub mod db_error;
pub mod hash;
pub mod salt;
