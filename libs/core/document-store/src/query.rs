//! Document query handle: a not-yet-executed read that callers compose
//! step by step and execute explicitly.

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::StoreResult;
use crate::store::{DocumentStore, FindSpec, and_all};

/// A composable read against one collection.
///
/// Composition is synchronous and performs no I/O; only [`fetch`] and
/// [`count_where`] touch the store.
///
/// [`fetch`]: DocumentQuery::fetch
/// [`count_where`]: DocumentQuery::count_where
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    /// AND another match condition onto the query.
    fn and_where(&mut self, condition: Document);

    fn sort(&mut self, sort: Document);

    fn skip(&mut self, skip: u64);

    fn limit(&mut self, limit: i64);

    fn project(&mut self, projection: Document);

    /// Execute with every composed condition, sort, window and projection.
    async fn fetch(&self) -> StoreResult<Vec<Document>>;

    /// Count documents matching `conditions` against the same collection,
    /// ignoring whatever sort, window or projection the handle carries.
    async fn count_where(&self, conditions: &[Document]) -> StoreResult<u64>;
}

/// [`DocumentQuery`] over any [`DocumentStore`]
pub struct FindQuery<'a, S: ?Sized> {
    store: &'a S,
    conditions: Vec<Document>,
    spec: FindSpec,
}

impl<'a, S: DocumentStore + ?Sized> FindQuery<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            conditions: Vec::new(),
            spec: FindSpec::default(),
        }
    }

    /// The combined match filter as it will be sent to the store
    pub fn filter(&self) -> Document {
        and_all(&self.conditions)
    }

    pub fn spec(&self) -> &FindSpec {
        &self.spec
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentQuery for FindQuery<'_, S> {
    fn and_where(&mut self, condition: Document) {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
    }

    fn sort(&mut self, sort: Document) {
        self.spec.sort = (!sort.is_empty()).then_some(sort);
    }

    fn skip(&mut self, skip: u64) {
        self.spec.skip = Some(skip);
    }

    fn limit(&mut self, limit: i64) {
        self.spec.limit = Some(limit);
    }

    fn project(&mut self, projection: Document) {
        self.spec.projection = (!projection.is_empty()).then_some(projection);
    }

    async fn fetch(&self) -> StoreResult<Vec<Document>> {
        self.store.find(self.filter(), self.spec.clone()).await
    }

    async fn count_where(&self, conditions: &[Document]) -> StoreResult<u64> {
        self.store.count(and_all(conditions)).await
    }
}
