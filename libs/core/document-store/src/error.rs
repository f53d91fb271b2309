use mongodb::bson;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB's server error code for unique index violations.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("Failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Unsupported query operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported aggregation stage: {0}")]
    UnsupportedStage(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// True for unique-index violations from any backend.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            StoreError::DuplicateKey(_) => true,
            StoreError::Mongo(err) => matches!(
                *err.kind,
                ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == DUPLICATE_KEY_CODE
            ),
            _ => false,
        }
    }

    /// True when the server could not be reached, as opposed to rejecting the operation.
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Mongo(err) => matches!(
                *err.kind,
                ErrorKind::ServerSelection { .. }
                    | ErrorKind::Io(_)
                    | ErrorKind::ConnectionPoolCleared { .. }
            ),
            _ => false,
        }
    }
}
