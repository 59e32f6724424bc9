//! Request types
//!
//! Paging and ordering parameters accepted by list operations

use serde::{Deserialize, Serialize};

/// Default page size when the caller sends 0 or nothing
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// One ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Column name; validated against a per-entity whitelist before use
    pub field: String,
    /// Descending when true
    #[serde(default)]
    pub desc: bool,
}

impl OrderItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }
}

/// Page query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 10, max: 100)
    #[serde(default = "default_size")]
    pub size: u32,

    /// Ordering clauses, applied left to right
    #[serde(default)]
    pub order: Vec<OrderItem>,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
            order: Vec::new(),
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            order: Vec::new(),
        }
    }

    /// Append an ordering clause
    pub fn order_by(mut self, item: OrderItem) -> Self {
        self.order.push(item);
        self
    }

    /// Clamp page/size into their valid ranges
    pub fn normalize(&mut self) {
        if self.page == 0 {
            self.page = 1;
        }
        if self.size == 0 {
            self.size = DEFAULT_PAGE_SIZE;
        }
        self.size = self.size.min(MAX_PAGE_SIZE);
    }

    /// Get the offset for database queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.limit())
    }

    /// Get the limit (clamped to max 100)
    pub fn limit(&self) -> u32 {
        match self.size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.size, 10);
        assert!(q.order.is_empty());
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_offset_and_limit() {
        let q = PageQuery::new(3, 20);
        assert_eq!(q.offset(), 40);
        assert_eq!(q.limit(), 20);

        let q = PageQuery::new(2, 500);
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 100);
    }

    #[test]
    fn test_normalize() {
        let mut q = PageQuery::new(0, 0);
        q.normalize();
        assert_eq!((q.page, q.size), (1, 10));

        let mut q = PageQuery::new(4, 1000);
        q.normalize();
        assert_eq!((q.page, q.size), (4, 100));
    }

    #[test]
    fn test_order_deserialize() {
        let q: PageQuery =
            serde_json::from_str(r#"{"page":2,"order":[{"field":"sort"},{"field":"code","desc":true}]}"#)
                .unwrap();
        assert_eq!(q.order, vec![OrderItem::asc("sort"), OrderItem::desc("code")]);
    }
}
