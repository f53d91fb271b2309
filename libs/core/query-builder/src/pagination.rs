pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Resolved page window. Both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Resolve raw `page`/`limit` strings.
    ///
    /// Missing or non-numeric input falls back to the defaults; numbers
    /// below 1 are clamped to 1. `max_limit` caps the page size when set.
    pub fn resolve(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u64,
        max_limit: Option<u64>,
    ) -> Self {
        let page = parse_clamped(page).unwrap_or(DEFAULT_PAGE);
        let mut limit = parse_clamped(limit).unwrap_or(default_limit.max(1));
        if let Some(max) = max_limit {
            limit = limit.min(max.max(1));
        }
        Self { page, limit }
    }

    /// Documents to skip; saturates at `i64::MAX`, the largest skip the
    /// server accepts.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }

    pub fn take(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

fn parse_clamped(raw: Option<&str>) -> Option<u64> {
    let n = raw?.trim().parse::<i64>().ok()?;
    Some(u64::try_from(n).unwrap_or(0).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = Pagination::resolve(None, None, 25, None);
        assert_eq!(p, Pagination { page: 1, limit: 25 });
        assert_eq!(p.skip(), 0);
    }

    #[test]
    fn test_skip_and_take() {
        let p = Pagination::resolve(Some("3"), Some("10"), 10, None);
        assert_eq!(p.skip(), 20);
        assert_eq!(p.take(), 10);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let p = Pagination::resolve(Some("two"), Some("1.5"), 10, None);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        let p = Pagination::resolve(Some(""), Some("ten"), 0, None);
        assert_eq!(p, Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn test_non_positive_numbers_clamp_to_one() {
        let p = Pagination::resolve(Some("0"), Some("-5"), 10, None);
        assert_eq!(p, Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn test_max_limit_caps_page_size() {
        let p = Pagination::resolve(Some("2"), Some("1000"), 10, Some(100));
        assert_eq!(p.limit, 100);
        assert_eq!(p.skip(), 100);
    }

    #[test]
    fn test_skip_saturates() {
        let max = i64::MAX.to_string();
        let p = Pagination::resolve(Some(max.as_str()), Some(max.as_str()), 10, None);
        assert_eq!(p.skip(), i64::MAX as u64);

        let p = Pagination::resolve(Some("100000000000000000"), Some("100"), 10, None);
        assert_eq!(p.skip(), i64::MAX as u64);
    }
}
