//! Page-based pagination types shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Maximum page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters for paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageQuery {
    /// Clamps the query to sane bounds and returns `(limit, offset)`.
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.max(1);
        (per_page, (page - 1) * per_page)
    }
}

/// Pagination metadata returned alongside list data.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageInfo {
    /// Builds page info from a clamped query and a total row count.
    pub fn new(query: &PageQuery, total: i64) -> Self {
        Self {
            page: query.page.max(1),
            per_page: query.per_page.clamp(1, MAX_PER_PAGE),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset_first_page() {
        let query = PageQuery { page: 1, per_page: 20 };
        assert_eq!(query.limit_offset(), (20, 0));
    }

    #[test]
    fn test_limit_offset_later_page() {
        let query = PageQuery { page: 3, per_page: 10 };
        assert_eq!(query.limit_offset(), (10, 20));
    }

    #[test]
    fn test_limit_offset_clamps_bounds() {
        let query = PageQuery { page: 0, per_page: 1000 };
        assert_eq!(query.limit_offset(), (MAX_PER_PAGE, 0));

        let query = PageQuery { page: -5, per_page: 0 };
        assert_eq!(query.limit_offset(), (1, 0));
    }

    #[test]
    fn test_default_query() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_page_info() {
        let query = PageQuery { page: 2, per_page: 25 };
        let info = PageInfo::new(&query, 120);
        assert_eq!(info.page, 2);
        assert_eq!(info.per_page, 25);
        assert_eq!(info.total, 120);
    }
}
