//! Business logic services for the application layer.

pub mod generation_options;
pub mod generation_service;
pub mod lookup_service;

pub use generation_options::{GenerationOptions, OptionsError};
pub use generation_service::GenerationService;
pub use lookup_service::LookupService;
