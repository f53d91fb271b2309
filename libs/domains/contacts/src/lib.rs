//! Contacts Domain
//!
//! Contact-form submissions with listing, status handling and soft delete.
//!
//! ```text
//! ┌──────────────────────┐
//! │      Handlers        │  ← HTTP endpoints
//! └──────────┬───────────┘
//! ┌──────────▼───────────┐
//! │   ContactService     │  ← validation, QueryBuilder listing
//! └──────────┬───────────┘
//! ┌──────────▼───────────┐
//! │ SoftDeleteCollection │  ← guard over any DocumentStore
//! └──────────────────────┘
//! ```
//!
//! ```rust,no_run
//! use document_store::MongoStore;
//! use domain_contacts::{ContactService, handlers, service::COLLECTION};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let store = MongoStore::new(&client.database("marketplace"), COLLECTION);
//! let router = handlers::router(ContactService::new(store));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod indexes;
pub mod models;
pub mod service;

pub use error::{ContactError, ContactResult};
pub use handlers::ApiDoc;
pub use indexes::indexes;
pub use models::{Contact, ContactStatus, CreateContact, UpdateContactStatus};
pub use service::ContactService;
