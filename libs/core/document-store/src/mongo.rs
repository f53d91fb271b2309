//! MongoDB-backed [`DocumentStore`]

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::Document,
    options::FindOptions,
};
use tracing::instrument;

use crate::error::StoreResult;
use crate::store::{DocumentStore, FindSpec, UpdateOutcome};

/// A MongoDB collection of untyped documents
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Document>(collection_name),
        }
    }

    pub fn from_collection(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Underlying collection for operations the trait does not cover
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Create indexes; existing indexes with the same definition are left alone.
    #[instrument(skip(self, indexes), fields(collection = %self.collection.name()))]
    pub async fn init_indexes(&self, indexes: Vec<IndexModel>) -> StoreResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }
        self.collection.create_indexes(indexes).await?;
        tracing::info!("Indexes created");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    #[instrument(skip(self, document), fields(collection = %self.collection.name()))]
    async fn insert_one(&self, document: Document) -> StoreResult<()> {
        self.collection.insert_one(document).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn find_one(&self, filter: Document) -> StoreResult<Option<Document>> {
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn find(&self, filter: Document, spec: FindSpec) -> StoreResult<Vec<Document>> {
        let options = FindOptions::builder()
            .sort(spec.sort)
            .skip(spec.skip)
            .limit(spec.limit)
            .projection(spec.projection)
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn count(&self, filter: Document) -> StoreResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn aggregate(&self, pipeline: Vec<Document>) -> StoreResult<Vec<Document>> {
        let cursor = self.collection.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<UpdateOutcome> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn delete_one(&self, filter: Document) -> StoreResult<u64> {
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count)
    }
}
