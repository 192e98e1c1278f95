//! Lookup error types.

use thiserror::Error;

/// Errors raised while resolving a title against the metadata provider.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No API key was configured.
    #[error("no OMDb API key configured (set REELOG_OMDB_API_KEY or OMDB_API_KEY)")]
    MissingApiKey,

    /// The provider answered with a non-success status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The request did not complete within the configured bound.
    #[error("request to {source_name} timed out after {seconds}s")]
    Timeout { source_name: String, seconds: u64 },

    /// The response body could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// The provider reported an error other than "not found".
    #[error("{source_name} error: {message}")]
    Provider {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl LookupError {
    /// Returns `true` for network-class failures that might succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Request(_)
        )
    }
}

/// Convenience alias for lookup results.
pub type LookupResult<T> = std::result::Result<T, LookupError>;
