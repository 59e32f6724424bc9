//! Shared types for the access control engine
//!
//! Data models, the error taxonomy, paging request/response types and
//! small utilities used by the server crate and its callers.

pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use request::{OrderItem, PageQuery};
pub use response::PageResult;
