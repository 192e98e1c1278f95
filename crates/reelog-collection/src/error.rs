//! Error taxonomy surfaced to the shell.

use std::path::PathBuf;

use thiserror::Error;

use reelog_enrich::LookupError;

#[derive(Debug, Error)]
pub enum CollectionError {
    /// The metadata provider could not be reached or answered badly.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("the collection has no data to work with")]
    EmptyCollection,

    #[error("no active profile; select or create one first")]
    NoActiveSession,

    /// The generated page or its template could not be read or written.
    #[error("cannot access {}: {}", .path.display(), .source)]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Database failure.
    #[error("storage error: {0}")]
    Storage(reelog_core::Error),
}

impl CollectionError {
    /// Storage failures mean the environment is broken; every other
    /// error is reported and the session carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<reelog_core::Error> for CollectionError {
    fn from(err: reelog_core::Error) -> Self {
        match err {
            reelog_core::Error::NotFound { entity, key } => Self::NotFound { entity, key },
            reelog_core::Error::Duplicate { entity, key } => Self::Duplicate { entity, key },
            reelog_core::Error::InvalidData(message) => Self::Validation(message),
            other => Self::Storage(other),
        }
    }
}

pub type CollectionResult<T> = std::result::Result<T, CollectionError>;
