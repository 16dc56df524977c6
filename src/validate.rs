//! `image_url` validation.
//!
//! A single pattern search decides whether the input looks like an http(s)
//! URL, then the lowercased string must end in a known image extension. The
//! pattern is deliberately loose: it is a search, not an anchored match, so
//! leading or trailing garbage around a URL-shaped substring passes.
//! Matching is ASCII-only: case folding and `\b` never consider non-ASCII
//! letters.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i-u)https?://(www\.)?[-a-z0-9@:%._+~#=]{2,256}\.[a-z]{2,4}\b([-a-z0-9@:%_+.~#?&/=]*)",
    )
    .expect("hardcoded url regex is invalid - fix source code")
});

/// Extensions accepted at the end of the lowercased URL.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".jpeg", ".jpg", ".png", ".bmp", ".tiff"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("image_url is missing or empty")]
    MissingInput,

    #[error("image_url does not look like an http(s) url")]
    MalformedUrl,

    #[error("image_url does not end in a supported image extension")]
    UnsupportedType,
}

/// A URL that passed [`validate`]. Not yet known to be reachable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate(url: Option<&str>) -> Result<ValidatedUrl, ValidationError> {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => return Err(ValidationError::MissingInput),
    };

    if !URL_PATTERN.is_match(url) {
        return Err(ValidationError::MalformedUrl);
    }

    let lower = url.to_lowercase();
    if !SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Err(ValidationError::UnsupportedType);
    }

    Ok(ValidatedUrl(url.to_owned()))
}
