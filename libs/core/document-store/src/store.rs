//! Storage seam shared by the MongoDB backend, the in-memory backend and the
//! soft-delete decorator.

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, doc};

use crate::error::StoreResult;

/// Options applied to a multi-document read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    /// `None` returns every matching document
    pub limit: Option<i64>,
    pub projection: Option<Document>,
}

/// Counts reported by a single-document update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    pub fn found(&self) -> bool {
        self.matched > 0
    }
}

/// A collection of raw BSON documents.
///
/// Filters, sorts, projections and update documents use MongoDB syntax so
/// the same composed query runs against either backend.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, document: Document) -> StoreResult<()>;

    async fn find_one(&self, filter: Document) -> StoreResult<Option<Document>>;

    async fn find(&self, filter: Document, spec: FindSpec) -> StoreResult<Vec<Document>>;

    async fn count(&self, filter: Document) -> StoreResult<u64>;

    async fn aggregate(&self, pipeline: Vec<Document>) -> StoreResult<Vec<Document>>;

    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<UpdateOutcome>;

    /// Returns the number of documents removed (0 or 1).
    async fn delete_one(&self, filter: Document) -> StoreResult<u64>;
}

/// AND-combine `conditions` into one filter.
///
/// Empty input yields `{}` (match everything) and a single condition is
/// returned as-is, so simple queries keep their natural shape.
pub fn and_all(conditions: &[Document]) -> Document {
    match conditions {
        [] => Document::new(),
        [single] => single.clone(),
        many => {
            let clauses: Vec<Bson> = many.iter().cloned().map(Bson::Document).collect();
            doc! { "$and": clauses }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_all_shapes() {
        assert_eq!(and_all(&[]), Document::new());

        let status = doc! { "status": "new" };
        assert_eq!(and_all(std::slice::from_ref(&status)), status);

        let rate = doc! { "rate": { "$gte": 100 } };
        assert_eq!(
            and_all(&[status.clone(), rate.clone()]),
            doc! { "$and": [status, rate] }
        );
    }

    #[test]
    fn test_update_outcome_found() {
        assert!(!UpdateOutcome::default().found());
        assert!(
            UpdateOutcome {
                matched: 1,
                modified: 0
            }
            .found()
        );
    }
}
