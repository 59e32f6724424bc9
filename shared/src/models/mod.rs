//! Data models
//!
//! Plain data shared by the engine and its callers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are opaque `String`s.

pub mod association;
pub mod permission;
pub mod role;
pub mod status;

// Re-exports
pub use association::*;
pub use permission::*;
pub use role::*;
pub use status::*;
