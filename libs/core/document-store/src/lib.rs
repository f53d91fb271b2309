//! Document storage for the marketplace services
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │     FindQuery        │  ← composable query handle (DocumentQuery)
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ SoftDeleteCollection │  ← guard: every read excludes isDeleted = true
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │    DocumentStore     │  ← trait: MongoStore (production), MemoryStore (tests)
//! └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use document_store::{DocumentQuery, MongoStore, SoftDeleteCollection};
//! use mongodb::{Client, bson::doc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let contacts = SoftDeleteCollection::new(MongoStore::new(&client.database("marketplace"), "contacts"));
//!
//! let mut query = contacts.query();
//! query.and_where(doc! { "status": "new" });
//! query.sort(doc! { "createdAt": -1 });
//! query.limit(10);
//! let page = query.fetch().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod json;
pub mod matcher;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod soft_delete;
pub mod store;
pub mod timestamp;

pub use mongodb::bson;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{DocumentQuery, FindQuery};
pub use soft_delete::{DELETED_AT_FIELD, IS_DELETED_FIELD, SoftDeleteCollection};
pub use store::{DocumentStore, FindSpec, UpdateOutcome, and_all};

#[cfg(any(test, feature = "mock"))]
pub use query::MockDocumentQuery;
#[cfg(any(test, feature = "mock"))]
pub use store::MockDocumentStore;
