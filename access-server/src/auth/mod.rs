//! 授权模块
//!
//! Pure policy building blocks used by the authorization services:
//! - [`PermissionMatcher`] - glob matching of granted codes
//! - [`build_permission_tree`] - flat list → forest
//! - [`GrantedPermissions`] - a user's resolved codes with check helpers

pub mod grant;
pub mod matcher;
pub mod tree;

pub use grant::GrantedPermissions;
pub use matcher::{PermissionMatcher, filter_permissions, has_permission, match_permission};
pub use tree::{build_permission_tree, build_permission_tree_under, tree_size};
