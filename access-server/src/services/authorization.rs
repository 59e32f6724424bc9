//! Authorization Query Engine
//!
//! Read side of RBAC: resolves what a role grants and what a user can do,
//! and shapes permission sets into trees for menus.
//!
//! | Query | Source |
//! |-------|--------|
//! | role → permission ids / rows | `role_permission` join |
//! | user → permissions | `user_role` → `role_permission` join, distinct |
//! | user → codes / check | same join, enabled roles and permissions only |

use std::collections::HashSet;

use shared::error::AppResult;
use shared::models::{Permission, PermissionNode, Role, is_root_parent};
use sqlx::SqlitePool;

use crate::auth::{GrantedPermissions, PermissionMatcher, build_permission_tree, build_permission_tree_under};
use crate::db::repository::{PermissionRepository, role_permission, user_role};

#[derive(Clone)]
pub struct AuthorizationService {
    pool: SqlitePool,
    permissions: PermissionRepository,
    matcher: PermissionMatcher,
}

impl AuthorizationService {
    pub fn new(pool: SqlitePool, matcher: PermissionMatcher) -> Self {
        Self {
            permissions: PermissionRepository::new(pool.clone()),
            pool,
            matcher,
        }
    }

    pub fn matcher(&self) -> &PermissionMatcher {
        &self.matcher
    }

    pub async fn get_role_permission_ids(&self, role_id: &str) -> AppResult<Vec<String>> {
        Ok(role_permission::find_permission_ids(&self.pool, role_id).await?)
    }

    pub async fn get_role_permissions_with_details(&self, role_id: &str) -> AppResult<Vec<Permission>> {
        Ok(role_permission::find_permissions(&self.pool, role_id).await?)
    }

    /// Distinct live permissions reachable through the user's live roles,
    /// ordered by sort. Disabled rows are included.
    pub async fn get_user_all_permissions(&self, user_id: &str) -> AppResult<Vec<Permission>> {
        let permissions = user_role::find_permissions(&self.pool, user_id, false).await?;
        tracing::debug!(user_id = %user_id, count = permissions.len(), "User permissions resolved");
        Ok(permissions)
    }

    pub async fn get_role_permission_tree(&self, role_id: &str) -> AppResult<Vec<PermissionNode>> {
        let permissions = self.get_role_permissions_with_details(role_id).await?;
        Ok(build_permission_tree(permissions))
    }

    /// Forest under `parent_id`: full depth from a root sentinel, the direct
    /// children as leaves for a concrete parent
    pub async fn get_permission_tree(&self, parent_id: &str) -> AppResult<Vec<PermissionNode>> {
        if is_root_parent(parent_id) {
            return self.get_full_permission_tree().await;
        }
        let children = self.permissions.find_by_parent(parent_id).await?;
        Ok(build_permission_tree_under(children, parent_id))
    }

    pub async fn get_full_permission_tree(&self) -> AppResult<Vec<PermissionNode>> {
        let all = self.permissions.find_all().await?;
        Ok(build_permission_tree(all))
    }

    pub async fn get_user_role_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let roles = user_role::find_roles(&self.pool, user_id).await?;
        Ok(roles.into_iter().map(|r| r.id).collect())
    }

    pub async fn get_user_roles(&self, user_id: &str) -> AppResult<Vec<Role>> {
        Ok(user_role::find_roles(&self.pool, user_id).await?)
    }

    pub async fn get_role_user_ids(&self, role_id: &str) -> AppResult<Vec<String>> {
        Ok(user_role::find_user_ids(&self.pool, role_id).await?)
    }

    /// Distinct codes of enabled permissions reachable through enabled roles
    pub async fn get_user_permission_codes(&self, user_id: &str) -> AppResult<Vec<String>> {
        let permissions = user_role::find_permissions(&self.pool, user_id, true).await?;
        let mut seen = HashSet::with_capacity(permissions.len());
        Ok(permissions
            .into_iter()
            .map(|p| p.code)
            .filter(|code| seen.insert(code.clone()))
            .collect())
    }

    pub async fn get_granted_permissions(&self, user_id: &str) -> AppResult<GrantedPermissions> {
        let codes = self.get_user_permission_codes(user_id).await?;
        Ok(GrantedPermissions::new(user_id, codes, self.matcher.clone()))
    }

    /// Whether any of the user's granted codes matches `requested`
    pub async fn check_user_permission(&self, user_id: &str, requested: &str) -> AppResult<bool> {
        let granted = self.get_granted_permissions(user_id).await?;
        let allowed = granted.has_permission(requested);
        tracing::debug!(user_id = %user_id, requested = %requested, allowed, "Permission check");
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{Repository, RoleRepository};
    use crate::services::{AssociationService, RoleService};
    use shared::models::{PermissionCreate, PermissionUpdate, RoleCreate, RoleUpdate, Status};

    struct Fixture {
        authz: AuthorizationService,
        assoc: AssociationService,
        roles: RoleService,
        perms: PermissionRepository,
    }

    async fn fixture() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let roles = RoleService::new(RoleRepository::new(db.pool.clone()));
        Fixture {
            authz: AuthorizationService::new(db.pool.clone(), PermissionMatcher::default()),
            assoc: AssociationService::new(db.pool.clone(), roles.clone()),
            perms: PermissionRepository::new(db.pool),
            roles,
        }
    }

    impl Fixture {
        async fn permission(&self, code: &str, parent: Option<&str>, sort: i64) -> Permission {
            self.perms
                .create(
                    PermissionCreate {
                        code: code.into(),
                        name: code.into(),
                        parent_id: parent.map(str::to_string),
                        sort,
                        ..Default::default()
                    },
                    "admin",
                )
                .await
                .unwrap()
        }

        async fn role(&self, code: &str) -> Role {
            self.roles
                .create(
                    RoleCreate {
                        code: code.into(),
                        name: code.into(),
                        ..Default::default()
                    },
                    "admin",
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_user_permissions_are_distinct() {
        let f = fixture().await;
        let p1 = f.permission("order:create", None, 1).await;
        let p2 = f.permission("order:refund", None, 2).await;
        let r1 = f.role("cashier").await;
        let r2 = f.role("manager").await;
        f.assoc.assign_role_permissions(&r1.id, &[p1.id.clone()]).await.unwrap();
        f.assoc
            .assign_role_permissions(&r2.id, &[p1.id.clone(), p2.id.clone()])
            .await
            .unwrap();
        f.assoc
            .assign_roles_to_user("u1", &[r1.id.clone(), r2.id.clone()], "admin")
            .await
            .unwrap();

        let perms = f.authz.get_user_all_permissions("u1").await.unwrap();
        let ids: Vec<_> = perms.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![p1.id.as_str(), p2.id.as_str()]);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_excluded() {
        let f = fixture().await;
        let p1 = f.permission("a", None, 1).await;
        let p2 = f.permission("b", None, 2).await;
        let r = f.role("r").await;
        f.assoc
            .assign_role_permissions(&r.id, &[p1.id.clone(), p2.id.clone()])
            .await
            .unwrap();
        f.assoc.assign_roles_to_user("u1", &[r.id.clone()], "admin").await.unwrap();

        f.perms.delete(&p1.id, "admin").await.unwrap();
        assert_eq!(f.authz.get_role_permission_ids(&r.id).await.unwrap(), vec![p2.id.clone()]);
        assert_eq!(f.authz.get_user_all_permissions("u1").await.unwrap().len(), 1);

        f.roles.delete(&r.id, "admin").await.unwrap();
        assert!(f.authz.get_user_all_permissions("u1").await.unwrap().is_empty());
        assert!(f.authz.get_user_roles("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_rows_listed_but_not_granted() {
        let f = fixture().await;
        let p1 = f.permission("order:create", None, 1).await;
        let p2 = f.permission("order:refund", None, 2).await;
        let r = f.role("cashier").await;
        f.assoc
            .assign_role_permissions(&r.id, &[p1.id.clone(), p2.id.clone()])
            .await
            .unwrap();
        f.assoc.assign_roles_to_user("u1", &[r.id.clone()], "admin").await.unwrap();

        let mut upd = PermissionUpdate::from(&p2);
        upd.status = Status::Disabled;
        f.perms.update(&p2.id, upd, "admin").await.unwrap();

        assert_eq!(f.authz.get_user_all_permissions("u1").await.unwrap().len(), 2);
        assert_eq!(f.authz.get_user_permission_codes("u1").await.unwrap(), vec!["order:create"]);
        assert!(f.authz.check_user_permission("u1", "order:create").await.unwrap());
        assert!(!f.authz.check_user_permission("u1", "order:refund").await.unwrap());

        let mut upd = RoleUpdate::from(&r);
        upd.status = Status::Disabled;
        f.roles.update(&r.id, upd, "admin").await.unwrap();
        assert!(f.authz.get_user_permission_codes("u1").await.unwrap().is_empty());
        assert_eq!(f.authz.get_user_roles("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wildcard_grant() {
        let f = fixture().await;
        let p = f.permission("order:*", None, 1).await;
        let r = f.role("cashier").await;
        f.assoc.assign_role_permissions(&r.id, &[p.id.clone()]).await.unwrap();
        f.assoc.assign_roles_to_user("u1", &[r.id.clone()], "admin").await.unwrap();

        let granted = f.authz.get_granted_permissions("u1").await.unwrap();
        assert!(granted.has_permission("order:create"));
        assert!(!granted.has_permission("order:item:create"));
        assert!(!granted.has_permission("product:create"));
        assert!(!f.authz.check_user_permission("nobody", "order:create").await.unwrap());
    }

    #[tokio::test]
    async fn test_trees() {
        let f = fixture().await;
        let sys = f.permission("sys", None, 1).await;
        let user = f.permission("sys:user", Some(&sys.id), 1).await;
        let add = f.permission("sys:user:add", Some(&user.id), 1).await;
        let home = f.permission("home", None, 0).await;

        let full = f.authz.get_full_permission_tree().await.unwrap();
        assert_eq!(full.len(), 2);
        assert_eq!(full[0].permission.id, home.id);
        assert_eq!(full[1].children[0].children[0].permission.id, add.id);

        assert_eq!(f.authz.get_permission_tree("0").await.unwrap(), full);

        let under = f.authz.get_permission_tree(&sys.id).await.unwrap();
        assert_eq!(under.len(), 1);
        assert_eq!(under[0].permission.id, user.id);
        assert!(under[0].children.is_empty());

        // a role granted a child without its parent sees no orphan
        let r = f.role("r").await;
        f.assoc
            .assign_role_permissions(&r.id, &[sys.id.clone(), add.id.clone()])
            .await
            .unwrap();
        let tree = f.authz.get_role_permission_tree(&r.id).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_role_user_lookups() {
        let f = fixture().await;
        let r1 = f.role("a").await;
        let r2 = f.role("b").await;
        f.assoc
            .assign_roles_to_user("u1", &[r1.id.clone(), r2.id.clone()], "admin")
            .await
            .unwrap();
        f.assoc.assign_roles_to_user("u2", &[r1.id.clone()], "admin").await.unwrap();

        assert_eq!(f.authz.get_user_role_ids("u2").await.unwrap(), vec![r1.id.clone()]);
        assert_eq!(f.authz.get_role_user_ids(&r1.id).await.unwrap(), vec!["u1", "u2"]);
        assert_eq!(f.authz.get_role_user_ids(&r2.id).await.unwrap(), vec!["u1"]);
    }
}
