//! Resolved permission codes for one user

use serde::{Deserialize, Serialize};

use super::matcher::PermissionMatcher;

/// The distinct permission codes a user holds, ready for checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantedPermissions {
    pub user_id: String,
    pub codes: Vec<String>,
    #[serde(skip)]
    matcher: PermissionMatcher,
}

impl GrantedPermissions {
    pub fn new(user_id: impl Into<String>, codes: Vec<String>, matcher: PermissionMatcher) -> Self {
        Self {
            user_id: user_id.into(),
            codes,
            matcher,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// 检查是否拥有指定权限 (granted codes are glob patterns)
    pub fn has_permission(&self, requested: &str) -> bool {
        self.matcher.has_permission(&self.codes, requested)
    }

    /// 检查是否拥有任一指定权限
    pub fn has_any_permission(&self, requested: &[&str]) -> bool {
        requested.iter().any(|r| self.has_permission(r))
    }

    /// 检查是否拥有所有指定权限
    pub fn has_all_permissions(&self, requested: &[&str]) -> bool {
        requested.iter().all(|r| self.has_permission(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(codes: &[&str]) -> GrantedPermissions {
        GrantedPermissions::new(
            "u1",
            codes.iter().map(|c| c.to_string()).collect(),
            PermissionMatcher::default(),
        )
    }

    #[test]
    fn test_wildcard_grant() {
        let g = granted(&["order:*", "report:view"]);
        assert!(g.has_permission("order:refund"));
        assert!(!g.has_permission("order:refund:partial"));
        assert!(g.has_any_permission(&["user:delete", "report:view"]));
        assert!(!g.has_all_permissions(&["user:delete", "report:view"]));
        assert!(g.has_all_permissions(&["order:void", "report:view"]));
    }

    #[test]
    fn test_empty_grant() {
        let g = granted(&[]);
        assert!(g.is_empty());
        assert!(!g.has_permission("order:create"));
        assert!(!g.has_any_permission(&["order:create"]));
        // vacuous truth
        assert!(g.has_all_permissions(&[]));
    }

    #[test]
    fn test_serialize_skips_matcher() {
        let json = serde_json::to_value(granted(&["a:b"])).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["codes"][0], "a:b");
        assert!(json.get("matcher").is_none());
    }
}
