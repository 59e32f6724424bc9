//! Response types

use serde::{Deserialize, Serialize};

/// One page of a list query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total: i64,
    /// Current page number (1-based)
    pub page: u32,
    /// Page size used for this query
    pub size: u32,
    /// True if there are rows beyond this page
    pub has_more: bool,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, size: u32) -> Self {
        let has_more = i64::from(page) * i64::from(size) < total;
        Self {
            items,
            total,
            page,
            size,
            has_more,
        }
    }

    /// Map items, keeping paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            has_more: self.has_more,
        }
    }
}
