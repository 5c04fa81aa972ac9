//! DTOs for the URL shortening endpoint.

use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

/// Request to shorten a single URL.
///
/// Without `key` a key is generated; with `key` that exact key is stored or
/// the request fails with 409. Bounds mirror [`crate::domain::limits`].
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Absolute URL without control characters, so it can be sent back in a
    /// `Location` header.
    #[validate(length(min = 1, max = 2000))]
    #[validate(custom(function = "validate_redirect_target"))]
    pub url: String,

    #[validate(length(equal = 6))]
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub key: String,
    pub url: String,
    pub short_url: String,
}

/// Rejects targets that `GET /{key}` could not redirect to.
fn validate_redirect_target(url: &str) -> Result<(), ValidationError> {
    if url.chars().any(char::is_control) {
        return Err(ValidationError::new("control_characters")
            .with_message("URL must not contain control characters".into()));
    }

    Url::parse(url)
        .map_err(|_| ValidationError::new("url").with_message("Invalid URL format".into()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> ShortenRequest {
        ShortenRequest {
            url: url.to_string(),
            key: None,
        }
    }

    #[test]
    fn test_absolute_url_accepted() {
        assert!(request("https://example.com/path?q=1").validate().is_ok());
        assert!(request("https://пример.рф/страница").validate().is_ok());
    }

    #[test]
    fn test_control_characters_rejected() {
        for url in [
            "https://example.com/\nx",
            "https://example.com/\r\nSet-Cookie: a=b",
            "https://example.com/\tx",
            "https://example.com/\u{7f}",
        ] {
            let errors = request(url).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("url"), "{url:?}");
        }
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(request("example.com/page").validate().is_err());
        assert!(request("/just/a/path").validate().is_err());
    }

    #[test]
    fn test_key_length_checked() {
        let req = ShortenRequest {
            url: "https://example.com".to_string(),
            key: Some("abc".to_string()),
        };

        assert!(req.validate().unwrap_err().field_errors().contains_key("key"));
    }
}
