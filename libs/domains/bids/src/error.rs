use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use document_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BidError {
    #[error("Bid not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BidResult<T> = Result<T, BidError>;

impl From<BidError> for AppError {
    fn from(err: BidError) -> Self {
        match err {
            BidError::NotFound(id) => AppError::NotFound(format!("Bid {} not found", id)),
            BidError::Validation(msg) => AppError::BadRequest(msg),
            BidError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for BidError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<document_store::bson::ser::Error> for BidError {
    fn from(err: document_store::bson::ser::Error) -> Self {
        BidError::Store(err.into())
    }
}

impl From<document_store::bson::de::Error> for BidError {
    fn from(err: document_store::bson::de::Error) -> Self {
        BidError::Store(err.into())
    }
}
