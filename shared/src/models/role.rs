//! Role Model

use serde::{Deserialize, Serialize};

use super::Status;

/// Role entity (RBAC 角色): a named grant bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: String,
    pub code: String,
    pub name: String,
    pub status: Status,
    pub remark: Option<String>,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub deleted_at: Option<i64>,
    pub deleted_by: Option<String>,
}

/// Create role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCreate {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: Status,
    pub remark: Option<String>,
}

/// Update role payload (full replace)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub code: String,
    pub name: String,
    pub status: Status,
    pub remark: Option<String>,
}

impl From<&Role> for RoleUpdate {
    fn from(r: &Role) -> Self {
        Self {
            code: r.code.clone(),
            name: r.name.clone(),
            status: r.status,
            remark: r.remark.clone(),
        }
    }
}

/// List filter: `code`/`name` substring, `status` equality
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleFilter {
    pub code: Option<String>,
    pub name: Option<String>,
    pub status: Option<Status>,
}
