use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use document_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Coupon not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("An active coupon with code {0} already exists")]
    DuplicateCode(String),

    #[error("Unknown coupon code: {0}")]
    UnknownCode(String),

    #[error("Coupon {0} is not active")]
    Inactive(String),

    #[error("Coupon {0} has expired")]
    Expired(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CouponResult<T> = Result<T, CouponError>;

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::NotFound(id) => AppError::NotFound(format!("Coupon {} not found", id)),
            CouponError::Validation(msg) => AppError::BadRequest(msg),
            e @ CouponError::DuplicateCode(_) => AppError::Conflict(e.to_string()),
            e @ (CouponError::UnknownCode(_) | CouponError::Inactive(_) | CouponError::Expired(_)) => {
                AppError::UnprocessableEntity(e.to_string())
            }
            CouponError::Store(e) if e.is_duplicate_key() => {
                AppError::Conflict("An active coupon with this code already exists".to_string())
            }
            CouponError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<document_store::bson::ser::Error> for CouponError {
    fn from(err: document_store::bson::ser::Error) -> Self {
        CouponError::Store(err.into())
    }
}

impl From<document_store::bson::de::Error> for CouponError {
    fn from(err: document_store::bson::de::Error) -> Self {
        CouponError::Store(err.into())
    }
}
