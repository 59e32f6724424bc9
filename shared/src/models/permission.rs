//! Permission Model
//!
//! A permission is one grantable capability: a UI menu node or an API
//! route. Permissions form a forest through `parent_id`; top-level nodes
//! carry the root sentinel.

use serde::{Deserialize, Serialize};

use super::Status;

/// `parent_id` value written for top-level permissions
pub const ROOT_PARENT_ID: &str = "0";

/// True for either spelling of the root sentinel (`""` or `"0"`)
pub fn is_root_parent(parent_id: &str) -> bool {
    parent_id.is_empty() || parent_id == ROOT_PARENT_ID
}

/// Permission kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PermissionType {
    #[default]
    Menu,
    Api,
}

/// Permission entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: String,
    /// Unique among live rows; may embed glob wildcards when granted (`order:*`)
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub permission_type: PermissionType,
    pub parent_id: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub sort: i64,
    pub status: Status,
    pub remark: Option<String>,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub deleted_at: Option<i64>,
    pub deleted_by: Option<String>,
}

impl Permission {
    pub fn is_root(&self) -> bool {
        is_root_parent(&self.parent_id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Create permission payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionCreate {
    pub code: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub permission_type: PermissionType,
    /// `None` or a root sentinel creates a top-level permission
    pub parent_id: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub status: Status,
    pub remark: Option<String>,
}

/// Update permission payload (full replace of the mutable columns)
///
/// Partial updates load the row, convert with `PermissionUpdate::from(&row)`,
/// change the fields of interest, then save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionUpdate {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub permission_type: PermissionType,
    pub parent_id: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub sort: i64,
    pub status: Status,
    pub remark: Option<String>,
}

impl From<&Permission> for PermissionUpdate {
    fn from(p: &Permission) -> Self {
        Self {
            code: p.code.clone(),
            name: p.name.clone(),
            permission_type: p.permission_type,
            parent_id: p.parent_id.clone(),
            path: p.path.clone(),
            icon: p.icon.clone(),
            sort: p.sort,
            status: p.status,
            remark: p.remark.clone(),
        }
    }
}

/// List filter: `code`/`name` are substring matches, the rest equality
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionFilter {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub permission_type: Option<PermissionType>,
    pub parent_id: Option<String>,
    pub status: Option<Status>,
}

/// Permission plus its children; built in memory, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionNode {
    #[serde(flatten)]
    pub permission: Permission,
    #[serde(default)]
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, self included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PermissionNode::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Permission {
        Permission {
            id: "p1".into(),
            code: "order:create".into(),
            name: "Create order".into(),
            permission_type: PermissionType::Api,
            parent_id: "0".into(),
            path: Some("/orders".into()),
            icon: None,
            sort: 3,
            status: Status::Enabled,
            remark: None,
            created_at: 1,
            created_by: "admin".into(),
            updated_at: 1,
            updated_by: "admin".into(),
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn test_root_sentinel() {
        assert!(is_root_parent(""));
        assert!(is_root_parent("0"));
        assert!(!is_root_parent("p1"));
        assert!(sample().is_root());
    }

    #[test]
    fn test_type_serializes_as_type_field() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "api");
        assert!(json.get("permission_type").is_none());
    }

    #[test]
    fn test_update_from_row() {
        let p = sample();
        let mut upd = PermissionUpdate::from(&p);
        upd.sort = 9;
        assert_eq!(upd.code, p.code);
        assert_eq!(upd.parent_id, "0");
        assert_eq!(upd.sort, 9);
    }

    #[test]
    fn test_node_flattens_permission() {
        let mut root = PermissionNode::new(sample());
        root.children.push(PermissionNode::new(sample()));
        assert_eq!(root.size(), 2);
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["code"], "order:create");
        assert_eq!(json["children"].as_array().map(Vec::len), Some(1));
    }
}
