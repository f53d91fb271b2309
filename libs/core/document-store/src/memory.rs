//! In-process [`DocumentStore`] evaluating the same filter, sort, projection
//! and update documents as MongoDB. Used by handler and listing tests, and
//! handy for local runs without a database.

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::{StoreError, StoreResult};
use crate::matcher::{apply_update, matches, project, sort_documents};
use crate::store::{DocumentStore, FindSpec, UpdateOutcome};

pub struct MemoryStore {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_documents(name, Vec::new())
    }

    /// Seed the store; documents without `_id` get an ObjectId, as on insert.
    pub fn with_documents(name: impl Into<String>, documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(documents.into_iter().map(with_id).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every stored document, soft-deleted ones included
    pub async fn snapshot(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn with_id(document: Document) -> Document {
    if document.contains_key("_id") {
        return document;
    }
    let mut stored = doc! { "_id": ObjectId::new() };
    stored.extend(document);
    stored
}

fn filter_documents(documents: Vec<Document>, filter: &Document) -> StoreResult<Vec<Document>> {
    let mut kept = Vec::with_capacity(documents.len());
    for document in documents {
        if matches(&document, filter)? {
            kept.push(document);
        }
    }
    Ok(kept)
}

fn stage_count(stage: &str, value: &Bson) -> StoreResult<usize> {
    let count = match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        Bson::Double(n) if n.fract() == 0.0 => *n as i64,
        _ => -1,
    };
    usize::try_from(count)
        .map_err(|_| StoreError::InvalidQuery(format!("{stage} expects a non-negative integer")))
}

fn stage_document<'a>(stage: &str, value: &'a Bson) -> StoreResult<&'a Document> {
    value
        .as_document()
        .ok_or_else(|| StoreError::InvalidQuery(format!("{stage} expects a document")))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self, document), fields(collection = %self.name))]
    async fn insert_one(&self, document: Document) -> StoreResult<()> {
        let document = with_id(document);
        let mut documents = self.documents.write().await;
        if documents.iter().any(|existing| existing.get("_id") == document.get("_id")) {
            return Err(StoreError::DuplicateKey(format!(
                "{}._id {:?}",
                self.name,
                document.get("_id")
            )));
        }
        documents.push(document);
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn find_one(&self, filter: Document) -> StoreResult<Option<Document>> {
        let documents = self.documents.read().await;
        for document in documents.iter() {
            if matches(document, &filter)? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn find(&self, filter: Document, spec: FindSpec) -> StoreResult<Vec<Document>> {
        let snapshot = self.documents.read().await.clone();
        let mut found = filter_documents(snapshot, &filter)?;

        if let Some(ref sort) = spec.sort {
            sort_documents(&mut found, sort)?;
        }

        let skip = spec
            .skip
            .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        // MongoDB treats a zero limit as "no limit" and a negative one as its magnitude
        let take = match spec.limit {
            Some(n) if n != 0 => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
            _ => usize::MAX,
        };
        let window = found.into_iter().skip(skip).take(take);

        match spec.projection {
            Some(ref projection) => window.map(|doc| project(&doc, projection)).collect(),
            None => Ok(window.collect()),
        }
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn count(&self, filter: Document) -> StoreResult<u64> {
        let documents = self.documents.read().await;
        let mut total = 0;
        for document in documents.iter() {
            if matches(document, &filter)? {
                total += 1;
            }
        }
        Ok(total)
    }

    /// Supports `$match`, `$sort`, `$skip`, `$limit`, `$project` and `$count`.
    #[instrument(skip(self), fields(collection = %self.name))]
    async fn aggregate(&self, pipeline: Vec<Document>) -> StoreResult<Vec<Document>> {
        let mut current = self.documents.read().await.clone();

        for stage in &pipeline {
            let mut entries = stage.iter();
            let (Some((name, value)), None) = (entries.next(), entries.next()) else {
                return Err(StoreError::InvalidQuery(
                    "pipeline stages must have exactly one field".to_string(),
                ));
            };

            match name.as_str() {
                "$match" => current = filter_documents(current, stage_document(name, value)?)?,
                "$sort" => sort_documents(&mut current, stage_document(name, value)?)?,
                "$skip" => {
                    let n = stage_count(name, value)?.min(current.len());
                    current.drain(..n);
                }
                "$limit" => current.truncate(stage_count(name, value)?),
                "$project" => {
                    let projection = stage_document(name, value)?;
                    current = current
                        .iter()
                        .map(|doc| project(doc, projection))
                        .collect::<StoreResult<_>>()?;
                }
                "$count" => {
                    let field = value.as_str().ok_or_else(|| {
                        StoreError::InvalidQuery("$count expects a field name".to_string())
                    })?;
                    // like MongoDB, an empty input produces no count document
                    current = if current.is_empty() {
                        Vec::new()
                    } else {
                        vec![doc! { field: current.len() as i64 }]
                    };
                }
                other => return Err(StoreError::UnsupportedStage(other.to_string())),
            }
        }

        Ok(current)
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<UpdateOutcome> {
        let mut documents = self.documents.write().await;
        for document in documents.iter_mut() {
            if matches(document, &filter)? {
                let modified = apply_update(document, &update)?;
                return Ok(UpdateOutcome {
                    matched: 1,
                    modified: u64::from(modified),
                });
            }
        }
        Ok(UpdateOutcome::default())
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn delete_one(&self, filter: Document) -> StoreResult<u64> {
        let mut documents = self.documents.write().await;
        let mut position = None;
        for (index, document) in documents.iter().enumerate() {
            if matches(document, &filter)? {
                position = Some(index);
                break;
            }
        }
        Ok(match position {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts() -> MemoryStore {
        MemoryStore::with_documents(
            "contacts",
            (1..=5).map(|n| {
                doc! {
                    "_id": format!("c{n}"),
                    "name": format!("Contact {n}"),
                    "score": n,
                    "status": if n % 2 == 0 { "read" } else { "new" },
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_object_id() {
        let store = MemoryStore::new("contacts");
        store.insert_one(doc! { "name": "Ada" }).await.unwrap();

        let stored = store.snapshot().await;
        assert_eq!(stored.len(), 1);
        assert!(matches!(stored[0].get("_id"), Some(Bson::ObjectId(_))));
        assert_eq!(stored[0].keys().next().map(String::as_str), Some("_id"));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = contacts();
        let err = store.insert_one(doc! { "_id": "c1" }).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_find_applies_sort_skip_limit_projection() {
        let store = contacts();
        let spec = FindSpec {
            sort: Some(doc! { "score": -1 }),
            skip: Some(1),
            limit: Some(2),
            projection: Some(doc! { "name": 1 }),
        };

        let found = store.find(doc! {}, spec).await.unwrap();
        assert_eq!(
            found,
            vec![
                doc! { "_id": "c4", "name": "Contact 4" },
                doc! { "_id": "c3", "name": "Contact 3" },
            ]
        );
    }

    #[tokio::test]
    async fn test_find_zero_limit_means_unbounded() {
        let store = contacts();
        let spec = FindSpec {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(store.find(doc! {}, spec).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_count_with_filter() {
        let store = contacts();
        assert_eq!(store.count(doc! { "status": "new" }).await.unwrap(), 3);
        assert_eq!(store.count(doc! { "score": { "$gt": 3 } }).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_pipeline() {
        let store = contacts();
        let result = store
            .aggregate(vec![
                doc! { "$match": { "status": "new" } },
                doc! { "$sort": { "score": -1 } },
                doc! { "$skip": 1 },
                doc! { "$limit": 1 },
                doc! { "$project": { "score": 1, "_id": 0 } },
            ])
            .await
            .unwrap();
        assert_eq!(result, vec![doc! { "score": 3 }]);

        let counted = store
            .aggregate(vec![doc! { "$match": { "status": "read" } }, doc! { "$count": "total" }])
            .await
            .unwrap();
        assert_eq!(counted, vec![doc! { "total": 2_i64 }]);
    }

    #[tokio::test]
    async fn test_aggregate_rejects_unknown_stage() {
        let store = contacts();
        let err = store
            .aggregate(vec![doc! { "$lookup": { "from": "bids" } }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedStage(stage) if stage == "$lookup"));
    }

    #[tokio::test]
    async fn test_update_one_and_delete_one() {
        let store = contacts();
        let outcome = store
            .update_one(doc! { "_id": "c2" }, doc! { "$set": { "status": "replied" } })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let missing = store
            .update_one(doc! { "_id": "nope" }, doc! { "$set": { "status": "replied" } })
            .await
            .unwrap();
        assert!(!missing.found());

        assert_eq!(store.delete_one(doc! { "_id": "c2" }).await.unwrap(), 1);
        assert_eq!(store.delete_one(doc! { "_id": "c2" }).await.unwrap(), 0);
        assert_eq!(store.len().await, 4);
    }
}
