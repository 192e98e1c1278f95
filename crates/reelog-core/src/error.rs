use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, key: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
