//! Association Manager
//!
//! Sole writer of the `role_permission` and `user_role` tables. Assignments
//! are replace-all: the old set is deleted and the new set inserted inside
//! one transaction, so a failure leaves the previous set intact.

use std::collections::HashSet;

use shared::error::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::db::repository::{PermissionRepository, RepoError, role_permission, user_role};
use crate::services::RoleService;

#[derive(Clone)]
pub struct AssociationService {
    pool: SqlitePool,
    permissions: PermissionRepository,
    roles: RoleService,
}

/// Drop repeated ids, keeping the first occurrence
fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect()
}

fn transaction_failed(what: &str, owner: &str, err: RepoError) -> AppError {
    tracing::warn!(owner = %owner, error = %err, "{what} rolled back");
    AppError::transaction(format!("{what} failed: {err}")).with_detail("id", owner)
}

impl AssociationService {
    pub fn new(pool: SqlitePool, roles: RoleService) -> Self {
        Self {
            permissions: PermissionRepository::new(pool.clone()),
            pool,
            roles,
        }
    }

    /// Every id must name a live permission. Soft-deleted rows still satisfy
    /// the foreign key, so the check cannot be left to the insert.
    async fn ensure_permissions_live(&self, ids: &[String]) -> AppResult<()> {
        let live: HashSet<String> = self
            .permissions
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let missing: Vec<String> = ids.iter().filter(|id| !live.contains(*id)).cloned().collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::with_message(
            ErrorCode::PermissionNotFound,
            format!("{} permission(s) not found", missing.len()),
        )
        .with_detail("missing", missing))
    }

    /// Replace the role's permission set. An empty list clears it.
    pub async fn assign_role_permissions(
        &self,
        role_id: &str,
        permission_ids: &[String],
    ) -> AppResult<()> {
        self.roles.ensure_exists(role_id).await?;
        let ids = dedup_ids(permission_ids);
        self.ensure_permissions_live(&ids).await?;

        let inserted = self
            .replace_role_permissions(role_id, &ids)
            .await
            .map_err(|e| transaction_failed("Role permission assignment", role_id, e))?;

        tracing::info!(role_id = %role_id, inserted, "Role permissions assigned");
        Ok(())
    }

    async fn replace_role_permissions(&self, role_id: &str, ids: &[String]) -> Result<u64, RepoError> {
        let mut tx = self.pool.begin().await?;
        role_permission::delete_by_role(&mut *tx, role_id).await?;
        let inserted = role_permission::insert_many(&mut *tx, role_id, ids).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Replace the user's role set, stamping `operator` on each new grant
    pub async fn assign_roles_to_user(
        &self,
        user_id: &str,
        role_ids: &[String],
        operator: &str,
    ) -> AppResult<()> {
        let ids = dedup_ids(role_ids);
        for role_id in &ids {
            self.roles.ensure_exists(role_id).await?;
        }

        let inserted = self
            .replace_user_roles(user_id, &ids, operator)
            .await
            .map_err(|e| transaction_failed("User role assignment", user_id, e))?;

        tracing::info!(user_id = %user_id, inserted, operator = %operator, "User roles assigned");
        Ok(())
    }

    async fn replace_user_roles(
        &self,
        user_id: &str,
        ids: &[String],
        operator: &str,
    ) -> Result<u64, RepoError> {
        let mut tx = self.pool.begin().await?;
        user_role::delete_by_user(&mut *tx, user_id).await?;
        let inserted = user_role::insert_many(&mut *tx, user_id, ids, operator).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Remove the named links, or every link of the role when the list is empty
    pub async fn remove_role_permissions(
        &self,
        role_id: &str,
        permission_ids: &[String],
    ) -> AppResult<u64> {
        let removed = if permission_ids.is_empty() {
            role_permission::delete_by_role(&self.pool, role_id).await?
        } else {
            role_permission::delete_some(&self.pool, role_id, &dedup_ids(permission_ids)).await?
        };
        tracing::info!(role_id = %role_id, removed, "Role permissions removed");
        Ok(removed)
    }

    pub async fn remove_user_role(&self, user_id: &str, role_id: &str) -> AppResult<u64> {
        let removed = user_role::delete_one(&self.pool, user_id, role_id).await?;
        tracing::info!(user_id = %user_id, role_id = %role_id, removed, "User role removed");
        Ok(removed)
    }

    /// Remove several grants at once; an empty list removes nothing
    pub async fn batch_remove_user_roles(&self, user_id: &str, role_ids: &[String]) -> AppResult<u64> {
        let removed = user_role::delete_some(&self.pool, user_id, &dedup_ids(role_ids)).await?;
        tracing::info!(user_id = %user_id, removed, "User roles removed");
        Ok(removed)
    }
}
