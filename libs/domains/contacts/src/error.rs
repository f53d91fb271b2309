use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use document_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Contact not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ContactResult<T> = Result<T, ContactError>;

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(id) => AppError::NotFound(format!("Contact {} not found", id)),
            ContactError::Validation(msg) => AppError::BadRequest(msg),
            ContactError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<document_store::bson::ser::Error> for ContactError {
    fn from(err: document_store::bson::ser::Error) -> Self {
        ContactError::Store(err.into())
    }
}

impl From<document_store::bson::de::Error> for ContactError {
    fn from(err: document_store::bson::de::Error) -> Self {
        ContactError::Store(err.into())
    }
}
