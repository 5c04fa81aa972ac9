//! Size limits shared by the generation pipeline, the API layer and storage.

/// Length of every short URL key, generated or caller-supplied.
pub const KEY_LENGTH: usize = 6;

/// Maximum length of a target URL, in characters.
pub const TARGET_URL_MAX_LENGTH: usize = 2000;
