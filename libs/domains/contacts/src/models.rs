use chrono::{DateTime, Utc};
use document_store::timestamp::{now_utc, rfc3339_millis};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Handling state of a contact-form submission
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContactStatus {
    /// Not yet opened
    #[default]
    New,
    Read,
    Replied,
}

/// A contact-form submission stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    /// Set when the contact is soft-deleted
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

/// DTO for submitting the contact form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContact {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// DTO for moving a contact through its handling states
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateContactStatus {
    pub status: ContactStatus,
}

impl Contact {
    pub fn new(input: CreateContact) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::now_v7().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            subject: input.subject,
            message: input.message,
            status: ContactStatus::New,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}
