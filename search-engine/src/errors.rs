//! Unified error handling for `search-engine`.
//!
//! All messages include the suffix `[Search Engine]` to simplify attribution in logs.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error for the `search-engine` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// Base URL is empty or does not start with http/https.
    #[error("[Search Engine] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Underlying HTTP transport error (connect, timeout, TLS).
    #[error("[Search Engine] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("[Search Engine] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("[Search Engine] decode error: {0}")]
    Decode(String),
}

impl EngineError {
    /// True when the engine answered with the given status.
    pub fn is_status(&self, code: StatusCode) -> bool {
        matches!(self, EngineError::HttpStatus { status, .. } if *status == code)
    }
}

/// Trims a response body to a short single-line snippet for error messages.
pub(crate) fn make_snippet(body: &str) -> String {
    const MAX: usize = 300;
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        return flat;
    }
    let mut out: String = flat.chars().take(MAX).collect();
    out.push('…');
    out
}
