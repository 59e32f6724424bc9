//! Repository Module
//!
//! SQLite persistence for the RBAC tables. Entity stores implement
//! [`Repository`]; the association tables expose free functions that run
//! inside a caller-owned transaction.

pub mod permission;
pub mod query;
pub mod role;
pub mod role_permission;
pub mod user_role;

// Re-exports
pub use permission::PermissionRepository;
pub use role::RoleRepository;

use shared::error::{AppError, ErrorCode};
use shared::request::PageQuery;
use shared::response::PageResult;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Transaction(msg) => AppError::transaction(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Common repository trait for entity stores with soft delete.
///
/// Every read excludes soft-deleted rows except [`Repository::find_by_id_unscoped`].
#[allow(async_fn_in_trait)]
pub trait Repository<T, CreateDto, UpdateDto, Filter> {
    /// Insert a new row, stamping id, creator and timestamps
    async fn create(&self, data: CreateDto, operator: &str) -> RepoResult<T>;

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>>;

    /// Same as `find_by_id` but also returns soft-deleted rows
    async fn find_by_id_unscoped(&self, id: &str) -> RepoResult<Option<T>>;

    /// Full replace of the mutable columns of a live row
    async fn update(&self, id: &str, data: UpdateDto, operator: &str) -> RepoResult<T>;

    /// Soft delete: stamps `deleted_at`/`deleted_by`
    async fn delete(&self, id: &str, operator: &str) -> RepoResult<()>;

    async fn count(&self, filter: &Filter) -> RepoResult<i64>;

    async fn list(&self, filter: &Filter, query: &PageQuery) -> RepoResult<Vec<T>>;

    /// `count` + `list` for one page
    async fn page(&self, filter: &Filter, mut query: PageQuery) -> RepoResult<PageResult<T>> {
        query.normalize();
        let total = self.count(filter).await?;
        let items = if total == 0 {
            Vec::new()
        } else {
            self.list(filter, &query).await?
        };
        Ok(PageResult::new(items, total, query.page, query.size))
    }
}
