//! Fluent listing builder over a [`DocumentQuery`] handle.

use document_store::bson::Document;
use document_store::{DocumentQuery, StoreResult};
use futures_util::future::try_join;
use tracing::instrument;

use crate::config::ListingConfig;
use crate::filter::FilterSet;
use crate::meta::{ListMeta, Paginated};
use crate::pagination::Pagination;
use crate::params::{FIELDS, LIMIT, PAGE, QueryParams, SEARCH_TERM, SORT};
use crate::projection::Projection;
use crate::search::search_condition;
use crate::sort::SortSpec;

/// Composes search, filter, sort, pagination and projection from untrusted
/// query parameters onto a document query.
///
/// Every step is synchronous and ignores malformed input. Search and filter
/// conditions are also kept on the builder so [`count_total`] can count
/// without the page window.
///
/// ```rust,ignore
/// let page = QueryBuilder::new(contacts.query(), &params)
///     .search(&["name", "email", "subject"])
///     .filter()
///     .sort_or("-createdAt")
///     .paginate()
///     .fields()
///     .page()
///     .await?;
/// ```
///
/// [`count_total`]: QueryBuilder::count_total
pub struct QueryBuilder<Q> {
    query: Q,
    params: QueryParams,
    config: ListingConfig,
    conditions: Vec<Document>,
}

impl<Q: DocumentQuery> QueryBuilder<Q> {
    pub fn new(query: Q, params: &QueryParams) -> Self {
        Self {
            query,
            params: params.clone(),
            config: ListingConfig::default(),
            conditions: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ListingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Self {
        self.config = self.config.with_default_limit(limit);
        self
    }

    pub fn max_limit(mut self, max: Option<u64>) -> Self {
        self.config = self.config.with_max_limit(max);
        self
    }

    /// Case-insensitive substring match of `searchTerm` across the fields.
    pub fn search(mut self, searchable_fields: &[&str]) -> Self {
        let condition = self
            .params
            .first(SEARCH_TERM)
            .and_then(|term| search_condition(term, searchable_fields));
        if let Some(condition) = condition {
            self.push_condition(condition);
        }
        self
    }

    /// Exact and `field[op]` conditions from every non-reserved parameter.
    pub fn filter(mut self) -> Self {
        for condition in FilterSet::from_params(&self.params).conditions() {
            self.push_condition(condition);
        }
        self
    }

    pub fn sort(self) -> Self {
        self.apply_sort(None)
    }

    /// Like [`sort`](Self::sort), using `default` when no usable `sort`
    /// parameter was sent.
    pub fn sort_or(self, default: &str) -> Self {
        self.apply_sort(Some(default))
    }

    pub fn paginate(mut self) -> Self {
        let pagination = self.pagination();
        self.query.skip(pagination.skip());
        self.query.limit(pagination.take());
        self
    }

    pub fn fields(mut self) -> Self {
        let projection = self.params.first(FIELDS).map(Projection::parse);
        if let Some(projection) = projection.and_then(|p| p.to_document()) {
            self.query.project(projection);
        }
        self
    }

    /// Page window resolved from `page`/`limit` and the listing config.
    pub fn pagination(&self) -> Pagination {
        Pagination::resolve(
            self.params.first(PAGE),
            self.params.first(LIMIT),
            self.config.default_limit,
            self.config.max_limit,
        )
    }

    /// Search and filter conditions applied so far
    pub fn conditions(&self) -> &[Document] {
        &self.conditions
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn into_query(self) -> Q {
        self.query
    }

    /// Count matching documents, ignoring sort, window and projection.
    #[instrument(skip(self), fields(conditions = self.conditions.len()))]
    pub async fn count_total(&self) -> StoreResult<ListMeta> {
        let total = self.query.count_where(&self.conditions).await?;
        Ok(ListMeta::new(total, self.pagination()))
    }

    pub async fn execute(&self) -> StoreResult<Vec<Document>> {
        self.query.fetch().await
    }

    /// Fetch the page and count the total concurrently.
    ///
    /// The two reads are independent; a write landing between them can make
    /// `total` and the page disagree slightly.
    #[instrument(skip(self))]
    pub async fn page(&self) -> StoreResult<Paginated<Document>> {
        let (result, meta) = try_join(self.execute(), self.count_total()).await?;
        Ok(Paginated::new(meta, result))
    }

    fn push_condition(&mut self, condition: Document) {
        self.conditions.push(condition.clone());
        self.query.and_where(condition);
    }

    fn apply_sort(mut self, default: Option<&str>) -> Self {
        let requested = self.params.first(SORT).map(SortSpec::parse).unwrap_or_default();
        let spec = match (requested.is_empty(), default) {
            (true, Some(default)) => SortSpec::parse(default),
            _ => requested,
        };
        if !spec.is_empty() {
            self.query.sort(spec.to_document());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::MockDocumentQuery;
    use document_store::bson::doc;
    use mockall::predicate::eq;

    fn params(query: &str) -> QueryParams {
        QueryParams::parse(query)
    }

    #[tokio::test]
    async fn test_count_total_uses_only_tracked_conditions() {
        let mut query = MockDocumentQuery::new();
        query.expect_and_where().times(2).return_const(());
        query.expect_sort().with(eq(doc! { "rate": -1, "_id": -1 })).times(1).return_const(());
        query.expect_skip().with(eq(20)).times(1).return_const(());
        query.expect_limit().with(eq(10)).times(1).return_const(());
        query.expect_project().with(eq(doc! { "rate": 1 })).times(1).return_const(());
        query
            .expect_count_where()
            .withf(|conditions: &[Document]| {
                conditions.to_vec()
                    == vec![
                        doc! { "$or": [ { "bidderName": { "$regex": "acme", "$options": "i" } } ] },
                        doc! { "status": "pending" },
                    ]
            })
            .times(1)
            .returning(|_| Ok(42));

        let builder = QueryBuilder::new(
            query,
            &params("searchTerm=acme&status=pending&sort=-rate&page=3&limit=10&fields=rate"),
        )
        .search(&["bidderName"])
        .filter()
        .sort()
        .paginate()
        .fields();

        let meta = builder.count_total().await.unwrap();
        assert_eq!(meta, ListMeta { total: 42, page: 3, limit: 10 });
    }

    #[test]
    fn test_no_parameters_touch_only_the_window() {
        let mut query = MockDocumentQuery::new();
        query.expect_and_where().never();
        query.expect_sort().never();
        query.expect_project().never();
        query.expect_skip().with(eq(0)).times(1).return_const(());
        query.expect_limit().with(eq(25)).times(1).return_const(());

        let builder = QueryBuilder::new(query, &QueryParams::new())
            .default_limit(25)
            .search(&["name"])
            .filter()
            .sort()
            .paginate()
            .fields();
        assert!(builder.conditions().is_empty());
    }

    #[test]
    fn test_sort_or_falls_back_to_default() {
        let mut query = MockDocumentQuery::new();
        query
            .expect_sort()
            .with(eq(doc! { "createdAt": -1, "_id": -1 }))
            .times(1)
            .return_const(());

        let _ = QueryBuilder::new(query, &params("sort=$bad")).sort_or("-createdAt");
    }

    #[test]
    fn test_huge_page_skip_stays_in_server_range() {
        let mut query = MockDocumentQuery::new();
        query.expect_skip().with(eq(i64::MAX as u64)).times(1).return_const(());
        query.expect_limit().with(eq(100)).times(1).return_const(());

        let builder =
            QueryBuilder::new(query, &params("page=100000000000000000&limit=100")).paginate();
        assert_eq!(builder.pagination().limit, 100);
    }

    #[test]
    fn test_limit_is_uncapped_by_default() {
        let query = MockDocumentQuery::new();
        let builder = QueryBuilder::new(query, &params("limit=150"));
        assert_eq!(builder.pagination(), Pagination { page: 1, limit: 150 });
    }

    #[test]
    fn test_max_limit_applies_to_window() {
        let query = MockDocumentQuery::new();
        let builder = QueryBuilder::new(query, &params("limit=500&page=2")).max_limit(Some(50));
        assert_eq!(builder.pagination(), Pagination { page: 2, limit: 50 });
    }

    #[test]
    fn test_caller_params_are_not_mutated() {
        let original = params("status=new");
        let mut query = MockDocumentQuery::new();
        query.expect_and_where().return_const(());
        let _ = QueryBuilder::new(query, &original).filter();
        assert_eq!(original.first("status"), Some("new"));
        assert_eq!(original.len(), 1);
    }
}
