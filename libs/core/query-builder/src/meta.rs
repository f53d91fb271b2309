use serde::Serialize;
use utoipa::ToSchema;

use crate::pagination::Pagination;

/// Pagination metadata returned alongside every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ListMeta {
    /// Documents matching filter and search, before pagination
    pub total: u64,
    /// 1-indexed page number
    pub page: u64,
    /// Page size
    pub limit: u64,
}

impl ListMeta {
    pub fn new(total: u64, pagination: Pagination) -> Self {
        Self {
            total,
            page: pagination.page,
            limit: pagination.limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }
}

/// `{ meta, result }` listing envelope
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub meta: ListMeta,
    pub result: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(meta: ListMeta, result: Vec<T>) -> Self {
        Self { meta, result }
    }

    /// Convert every item, keeping the metadata.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paginated<U>, E> {
        let result = self.result.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Paginated {
            meta: self.meta,
            result,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            meta: self.meta,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let page = Paginated::new(
            ListMeta::new(25, Pagination { page: 3, limit: 10 }),
            vec!["a", "b"],
        );
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "meta": { "total": 25, "page": 3, "limit": 10 },
                "result": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(ListMeta::new(25, Pagination { page: 1, limit: 10 }).total_pages(), 3);
        assert_eq!(ListMeta::new(0, Pagination { page: 1, limit: 10 }).total_pages(), 0);
    }

    #[test]
    fn test_try_map_short_circuits() {
        let page = Paginated::new(ListMeta::new(2, Pagination { page: 1, limit: 10 }), vec![1, -1]);
        let mapped: Result<Paginated<u32>, _> = page.try_map(u32::try_from);
        assert!(mapped.is_err());
    }
}
