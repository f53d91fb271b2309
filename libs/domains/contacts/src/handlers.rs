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
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use document_store::DocumentStore;
use query_builder::{ListMeta, ListingParams, Paginated, QueryParams};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ContactResult;
use crate::models::{Contact, ContactStatus, CreateContact, UpdateContactStatus};
use crate::service::ContactService;

/// OpenAPI documentation for the Contacts API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_contacts,
        create_contact,
        get_contact,
        update_contact_status,
        delete_contact,
        restore_contact,
    ),
    components(
        schemas(Contact, ContactStatus, CreateContact, UpdateContactStatus, ListMeta),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Contacts", description = "Contact-form submissions")
    )
)]
pub struct ApiDoc;

pub fn router<S: DocumentStore + 'static>(service: ContactService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_contacts).post(create_contact))
        .route(
            "/{id}",
            get(get_contact)
                .patch(update_contact_status)
                .delete(delete_contact),
        )
        .route("/{id}/restore", post(restore_contact))
        .with_state(shared_service)
}

/// List contacts
///
/// Accepts `field=value` and `field[gt|gte|lt|lte|ne|in]=value` filters in
/// addition to the listing parameters. Searches name, email and subject.
#[utoipa::path(
    get,
    path = "",
    tag = "Contacts",
    params(ListingParams),
    responses(
        (status = 200, description = "One page of contacts", body = Paginated<Contact>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_contacts<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    params: QueryParams,
) -> ContactResult<Json<Paginated<Value>>> {
    let page = service.list_contacts(&params).await?;
    Ok(Json(page))
}

/// Submit the contact form
#[utoipa::path(
    post,
    path = "",
    tag = "Contacts",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Contact stored", body = Contact),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_contact<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateContact>,
) -> ContactResult<impl IntoResponse> {
    let contact = service.create_contact(input).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Get a contact by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact found", body = Contact),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_contact<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<Contact>> {
    let contact = service.get_contact(id).await?;
    Ok(Json(contact))
}

/// Change a contact's handling status
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    request_body = UpdateContactStatus,
    responses(
        (status = 200, description = "Status updated", body = Contact),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_contact_status<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateContactStatus>,
) -> ContactResult<Json<Contact>> {
    let contact = service.update_status(id, input).await?;
    Ok(Json(contact))
}

/// Soft-delete a contact
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_contact<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<impl IntoResponse> {
    service.delete_contact(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted contact
#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact restored", body = Contact),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn restore_contact<S: DocumentStore>(
    State(service): State<Arc<ContactService<S>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<Contact>> {
    let contact = service.restore_contact(id).await?;
    Ok(Json(contact))
}
