use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, UnprocessableEntityResponse,
    },
};
use document_store::DocumentStore;
use query_builder::{ListMeta, ListingParams, Paginated, QueryParams};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CouponResult;
use crate::models::{AppliedCoupon, ApplyCoupon, Coupon, CreateCoupon, DiscountType};
use crate::service::CouponService;

#[derive(OpenApi)]
#[openapi(
    paths(list_coupons, create_coupon, get_coupon, delete_coupon, apply_coupon),
    components(
        schemas(Coupon, CreateCoupon, ApplyCoupon, AppliedCoupon, DiscountType, ListMeta),
        responses(
            NotFoundResponse,
            ConflictResponse,
            UnprocessableEntityResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Coupons", description = "Discount codes and checkout pricing")
    )
)]
pub struct ApiDoc;

pub fn router<S: DocumentStore + 'static>(service: CouponService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/apply", post(apply_coupon))
        .route("/{id}", get(get_coupon).delete(delete_coupon))
        .with_state(shared_service)
}

/// List coupons
///
/// Searches code and description.
#[utoipa::path(
    get,
    path = "",
    tag = "Coupons",
    params(ListingParams),
    responses(
        (status = 200, description = "One page of coupons", body = Paginated<Coupon>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_coupons<S: DocumentStore>(
    State(service): State<Arc<CouponService<S>>>,
    params: QueryParams,
) -> CouponResult<Json<Paginated<Value>>> {
    let page = service.list_coupons(&params).await?;
    Ok(Json(page))
}

/// Create a coupon
#[utoipa::path(
    post,
    path = "",
    tag = "Coupons",
    request_body = CreateCoupon,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_coupon<S: DocumentStore>(
    State(service): State<Arc<CouponService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateCoupon>,
) -> CouponResult<impl IntoResponse> {
    let coupon = service.create_coupon(input).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Coupons",
    params(
        ("id" = Uuid, Path, description = "Coupon ID")
    ),
    responses(
        (status = 200, description = "Coupon found", body = Coupon),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_coupon<S: DocumentStore>(
    State(service): State<Arc<CouponService<S>>>,
    UuidPath(id): UuidPath,
) -> CouponResult<Json<Coupon>> {
    let coupon = service.get_coupon(id).await?;
    Ok(Json(coupon))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Coupons",
    params(
        ("id" = Uuid, Path, description = "Coupon ID")
    ),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_coupon<S: DocumentStore>(
    State(service): State<Arc<CouponService<S>>>,
    UuidPath(id): UuidPath,
) -> CouponResult<impl IntoResponse> {
    service.delete_coupon(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a coupon to an order amount
///
/// Fails with 422 when the code is unknown, inactive or expired. An order
/// below the coupon's minimum gets a zero discount.
#[utoipa::path(
    post,
    path = "/apply",
    tag = "Coupons",
    request_body = ApplyCoupon,
    responses(
        (status = 200, description = "Discount computed", body = AppliedCoupon),
        (status = 400, response = BadRequestValidationResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn apply_coupon<S: DocumentStore>(
    State(service): State<Arc<CouponService<S>>>,
    ValidatedJson(input): ValidatedJson<ApplyCoupon>,
) -> CouponResult<Json<AppliedCoupon>> {
    let applied = service.apply_coupon(input).await?;
    Ok(Json(applied))
}
