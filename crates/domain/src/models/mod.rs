//! Domain models and per-endpoint DTOs.
//!
//! Response shapes are explicit structs per use case, produced by mapping
//! functions in the API layer.

pub mod activity;
pub mod delist_request;
pub mod event;
pub mod member;
pub mod report;

pub use activity::{ActivityItem, EnlistRequest, EnlistResponse};
pub use delist_request::{DelistRequestItem, DelistRequestStatus};
pub use event::EventItem;
pub use member::{MemberBrief, MemberProfile};

use serde::{Deserialize, Serialize};

/// Pagination info for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Common page/per_page query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

impl PageQuery {
    /// SQL LIMIT for this page.
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 200)
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 20);
    }

    #[test]
    fn test_page_query_limit_offset() {
        let query = PageQuery {
            page: 3,
            per_page: 25,
        };
        assert_eq!(query.limit(), 25);
        assert_eq!(query.offset(), 50);

        // Out-of-range values are clamped rather than rejected
        let query = PageQuery {
            page: 0,
            per_page: 10_000,
        };
        assert_eq!(query.limit(), 200);
        assert_eq!(query.offset(), 0);
    }
}
