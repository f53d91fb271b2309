use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use document_store::DocumentStore;
use query_builder::{ListMeta, ListingParams, Paginated, QueryParams};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::BidResult;
use crate::geo::GeoPoint;
use crate::models::{Bid, BidStatus, CreateBid, UpdateBid};
use crate::service::BidService;

#[derive(OpenApi)]
#[openapi(
    paths(list_bids, place_bid, get_bid, update_bid, delete_bid),
    components(
        schemas(Bid, BidStatus, CreateBid, UpdateBid, GeoPoint, ListMeta),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Bids", description = "Vendor offers on products")
    )
)]
pub struct ApiDoc;

pub fn router<S: DocumentStore + 'static>(service: BidService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_bids).post(place_bid))
        .route("/{id}", get(get_bid).patch(update_bid).delete(delete_bid))
        .with_state(shared_service)
}

/// List bids
///
/// Searches bidder name and message. With both `lat` and `lng`, located bids
/// carry `distanceKm` from that point.
#[utoipa::path(
    get,
    path = "",
    tag = "Bids",
    params(
        ListingParams,
        ("lat" = Option<f64>, Query, description = "Origin latitude for distanceKm"),
        ("lng" = Option<f64>, Query, description = "Origin longitude for distanceKm")
    ),
    responses(
        (status = 200, description = "One page of bids", body = Paginated<Bid>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_bids<S: DocumentStore>(
    State(service): State<Arc<BidService<S>>>,
    params: QueryParams,
) -> BidResult<Json<Paginated<Value>>> {
    let page = service.list_bids(&params).await?;
    Ok(Json(page))
}

/// Place a bid
#[utoipa::path(
    post,
    path = "",
    tag = "Bids",
    request_body = CreateBid,
    responses(
        (status = 201, description = "Bid placed", body = Bid),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn place_bid<S: DocumentStore>(
    State(service): State<Arc<BidService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateBid>,
) -> BidResult<impl IntoResponse> {
    let bid = service.place_bid(input).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Bids",
    params(
        ("id" = Uuid, Path, description = "Bid ID")
    ),
    responses(
        (status = 200, description = "Bid found", body = Bid),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_bid<S: DocumentStore>(
    State(service): State<Arc<BidService<S>>>,
    UuidPath(id): UuidPath,
) -> BidResult<Json<Bid>> {
    let bid = service.get_bid(id).await?;
    Ok(Json(bid))
}

/// Decide on a bid or revise its rate
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Bids",
    params(
        ("id" = Uuid, Path, description = "Bid ID")
    ),
    request_body = UpdateBid,
    responses(
        (status = 200, description = "Bid updated", body = Bid),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_bid<S: DocumentStore>(
    State(service): State<Arc<BidService<S>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBid>,
) -> BidResult<Json<Bid>> {
    let bid = service.update_bid(id, input).await?;
    Ok(Json(bid))
}

/// Soft-delete a bid
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Bids",
    params(
        ("id" = Uuid, Path, description = "Bid ID")
    ),
    responses(
        (status = 204, description = "Bid deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_bid<S: DocumentStore>(
    State(service): State<Arc<BidService<S>>>,
    UuidPath(id): UuidPath,
) -> BidResult<impl IntoResponse> {
    service.delete_bid(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
