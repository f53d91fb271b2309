//! Soft-delete guard as an explicit decorator.
//!
//! [`SoftDeleteCollection`] implements [`DocumentStore`] itself, so any code
//! holding one reads through the guard: single-document reads, multi-document
//! reads, counts, updates and aggregations all exclude documents whose
//! `isDeleted` flag is `true`. The only ways past it are [`hard_delete`],
//! [`restore`] and [`include_deleted`].
//!
//! Lifecycle: `active -> soft-deleted -> (physically removed | restored)`.
//!
//! [`hard_delete`]: SoftDeleteCollection::hard_delete
//! [`restore`]: SoftDeleteCollection::restore
//! [`include_deleted`]: SoftDeleteCollection::include_deleted

use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use tracing::instrument;

use crate::error::StoreResult;
use crate::query::FindQuery;
use crate::store::{DocumentStore, FindSpec, UpdateOutcome};
use crate::timestamp::now_timestamp;

pub const IS_DELETED_FIELD: &str = "isDeleted";
pub const DELETED_AT_FIELD: &str = "deletedAt";

/// `{ isDeleted: { $ne: true } }`; also matches documents without the flag.
pub fn guard_condition() -> Document {
    doc! { IS_DELETED_FIELD: { "$ne": true } }
}

/// Fields owned by the guard, which callers must never filter on directly.
pub fn is_guard_field(field: &str) -> bool {
    [IS_DELETED_FIELD, DELETED_AT_FIELD].iter().any(|guarded| {
        field == *guarded
            || field
                .strip_prefix(guarded)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

fn both(filter: Document, condition: Document) -> Document {
    if filter.is_empty() {
        condition
    } else {
        doc! { "$and": [filter, condition] }
    }
}

/// AND `filter` with the guard condition. Wrapping in `$and` means a
/// caller-supplied `isDeleted` key can narrow the result but never widen it.
pub fn guarded(filter: Document) -> Document {
    both(filter, guard_condition())
}

pub struct SoftDeleteCollection<S> {
    inner: S,
}

impl<S: DocumentStore> SoftDeleteCollection<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unguarded access, for admin views that must see deleted documents.
    pub fn include_deleted(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Start a composable query that reads through the guard.
    pub fn query(&self) -> FindQuery<'_, Self> {
        FindQuery::new(self)
    }

    /// Move the first active document matching `filter` to soft-deleted.
    ///
    /// Returns `false` when nothing active matched, including when the
    /// document was already soft-deleted.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, filter: Document) -> StoreResult<bool> {
        let update = doc! {
            "$set": { IS_DELETED_FIELD: true, DELETED_AT_FIELD: now_timestamp() }
        };
        let outcome = self.inner.update_one(guarded(filter), update).await?;
        if outcome.found() {
            tracing::info!("Document soft-deleted");
        }
        Ok(outcome.found())
    }

    /// Return a soft-deleted document to active. `deletedAt` is kept as history.
    #[instrument(skip(self))]
    pub async fn restore(&self, filter: Document) -> StoreResult<bool> {
        let filter = both(filter, doc! { IS_DELETED_FIELD: true });
        let update = doc! { "$set": { IS_DELETED_FIELD: false } };
        let outcome = self.inner.update_one(filter, update).await?;
        Ok(outcome.found())
    }

    /// Physically remove a document regardless of its flag.
    #[instrument(skip(self))]
    pub async fn hard_delete(&self, filter: Document) -> StoreResult<bool> {
        let removed = self.inner.delete_one(filter).await?;
        if removed > 0 {
            tracing::warn!("Document permanently removed");
        }
        Ok(removed > 0)
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for SoftDeleteCollection<S> {
    async fn insert_one(&self, mut document: Document) -> StoreResult<()> {
        if !document.contains_key(IS_DELETED_FIELD) {
            document.insert(IS_DELETED_FIELD, false);
        }
        self.inner.insert_one(document).await
    }

    async fn find_one(&self, filter: Document) -> StoreResult<Option<Document>> {
        self.inner.find_one(guarded(filter)).await
    }

    async fn find(&self, filter: Document, spec: FindSpec) -> StoreResult<Vec<Document>> {
        self.inner.find(guarded(filter), spec).await
    }

    async fn count(&self, filter: Document) -> StoreResult<u64> {
        self.inner.count(guarded(filter)).await
    }

    /// The guard `$match` is always the first stage, so grouping, lookups
    /// and counts further down never see deleted documents.
    async fn aggregate(&self, mut pipeline: Vec<Document>) -> StoreResult<Vec<Document>> {
        pipeline.insert(0, doc! { "$match": guard_condition() });
        self.inner.aggregate(pipeline).await
    }

    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<UpdateOutcome> {
        self.inner.update_one(guarded(filter), update).await
    }

    /// Deleting through the guard is a soft delete.
    async fn delete_one(&self, filter: Document) -> StoreResult<u64> {
        Ok(u64::from(self.soft_delete(filter).await?))
    }
}
