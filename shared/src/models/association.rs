//! Association Models
//!
//! Link rows between roles, permissions and users. They are written only
//! in bulk by the association manager and never updated in place.

use serde::{Deserialize, Serialize};

/// Role → permission grant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RolePermission {
    pub role_id: String,
    pub permission_id: String,
}

/// User → role grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserRole {
    pub user_id: String,
    pub role_id: String,
    /// Operator who granted the role
    pub created_by: String,
    pub created_at: i64,
    pub deleted_at: Option<i64>,
}
