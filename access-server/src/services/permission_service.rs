//! Permission Store
//!
//! CRUD over the permission catalog with soft delete, code uniqueness and
//! hierarchy checks on write.

use std::collections::HashSet;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Permission, PermissionCreate, PermissionFilter, PermissionUpdate, is_root_parent,
};
use shared::request::PageQuery;
use shared::response::PageResult;

use crate::db::repository::{PermissionRepository, RepoError, Repository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_code,
    validate_optional_text, validate_required_text,
};

#[derive(Clone)]
pub struct PermissionService {
    repo: PermissionRepository,
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::PermissionNotFound, format!("Permission {id} not found"))
        .with_detail("id", id)
}

fn code_exists(code: &str) -> AppError {
    AppError::with_message(
        ErrorCode::PermissionCodeExists,
        format!("Permission code '{code}' already exists"),
    )
    .with_detail("code", code)
}

/// Map repository errors, giving duplicates and misses their permission codes
fn map_repo(err: RepoError, id: &str, code: &str) -> AppError {
    match err {
        RepoError::Duplicate(_) => code_exists(code),
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    }
}

fn validate_fields(
    code: &str,
    name: &str,
    path: &Option<String>,
    icon: &Option<String>,
    remark: &Option<String>,
) -> AppResult<()> {
    validate_code(code, "code")?;
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    validate_optional_text(path, "path", MAX_URL_LEN)?;
    validate_optional_text(icon, "icon", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(remark, "remark", MAX_NOTE_LEN)?;
    Ok(())
}

impl PermissionService {
    pub fn new(repo: PermissionRepository) -> Self {
        Self { repo }
    }

    /// Create a permission; the code must be free among live rows and the
    /// parent must be a live permission or the root sentinel.
    pub async fn create(&self, data: PermissionCreate, operator: &str) -> AppResult<Permission> {
        validate_fields(&data.code, &data.name, &data.path, &data.icon, &data.remark)?;

        if self.repo.find_by_code(&data.code).await?.is_some() {
            return Err(code_exists(&data.code));
        }
        if let Some(parent_id) = data.parent_id.as_deref() {
            self.ensure_parent_exists(parent_id).await?;
        }

        let code = data.code.clone();
        let permission = self
            .repo
            .create(data, operator)
            .await
            .map_err(|e| map_repo(e, "", &code))?;

        tracing::info!(id = %permission.id, code = %permission.code, operator = %operator, "Permission created");
        Ok(permission)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Permission> {
        self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Live permission by code, if any
    pub async fn get_by_code(&self, code: &str) -> AppResult<Option<Permission>> {
        Ok(self.repo.find_by_code(code).await?)
    }

    /// Full replace of the mutable fields.
    ///
    /// Rejects a parent that is missing, the permission itself, or one of
    /// its descendants.
    pub async fn update(
        &self,
        id: &str,
        data: PermissionUpdate,
        operator: &str,
    ) -> AppResult<Permission> {
        validate_fields(&data.code, &data.name, &data.path, &data.icon, &data.remark)?;

        let existing = self.get_by_id(id).await?;

        if existing.code != data.code
            && let Some(holder) = self.repo.find_by_code(&data.code).await?
            && holder.id != id
        {
            return Err(code_exists(&data.code));
        }

        if !is_root_parent(&data.parent_id) && data.parent_id != existing.parent_id {
            self.ensure_parent_exists(&data.parent_id).await?;
            self.ensure_acyclic(id, &data.parent_id).await?;
        }

        let code = data.code.clone();
        let permission = self
            .repo
            .update(id, data, operator)
            .await
            .map_err(|e| map_repo(e, id, &code))?;

        tracing::info!(id = %id, code = %permission.code, operator = %operator, "Permission updated");
        Ok(permission)
    }

    /// Soft delete; children are left in place and drop out of trees
    pub async fn delete(&self, id: &str, operator: &str) -> AppResult<()> {
        self.repo
            .delete(id, operator)
            .await
            .map_err(|e| map_repo(e, id, ""))?;
        tracing::info!(id = %id, operator = %operator, "Permission deleted");
        Ok(())
    }

    pub async fn list_page(
        &self,
        filter: &PermissionFilter,
        query: PageQuery,
    ) -> AppResult<PageResult<Permission>> {
        let page = self.repo.page(filter, query).await?;
        tracing::debug!(total = page.total, page = page.page, "Permission page listed");
        Ok(page)
    }

    /// Direct children of `parent_id` ordered by sort; a root sentinel
    /// returns the top-level permissions
    pub async fn list_by_parent(&self, parent_id: &str) -> AppResult<Vec<Permission>> {
        Ok(self.repo.find_by_parent(parent_id).await?)
    }

    /// Every live permission ordered by sort
    pub async fn list_all(&self) -> AppResult<Vec<Permission>> {
        Ok(self.repo.find_all().await?)
    }

    async fn ensure_parent_exists(&self, parent_id: &str) -> AppResult<()> {
        if is_root_parent(parent_id) {
            return Ok(());
        }
        if self.repo.find_by_id(parent_id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::PermissionParentNotFound,
                format!("Parent permission {parent_id} not found"),
            )
            .with_detail("parent_id", parent_id));
        }
        Ok(())
    }

    /// Walk up from `new_parent`; reaching `id` means `id` would become its
    /// own ancestor.
    async fn ensure_acyclic(&self, id: &str, new_parent: &str) -> AppResult<()> {
        let mut visited = HashSet::new();
        let mut current = new_parent.to_string();
        while !is_root_parent(&current) {
            if current == id {
                return Err(cycle_error(id, new_parent));
            }
            // a pre-existing loop above us is not ours to report
            if !visited.insert(current.clone()) {
                break;
            }
            match self.repo.find_by_id(&current).await? {
                Some(p) => current = p.parent_id,
                None => break,
            }
        }
        Ok(())
    }
}

fn cycle_error(id: &str, parent_id: &str) -> AppError {
    AppError::new(ErrorCode::PermissionCycle)
        .with_detail("id", id)
        .with_detail("parent_id", parent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::PermissionType;

    async fn service() -> PermissionService {
        let db = DbService::in_memory().await.unwrap();
        PermissionService::new(PermissionRepository::new(db.pool))
    }

    fn create(code: &str, parent: Option<&str>) -> PermissionCreate {
        PermissionCreate {
            code: code.into(),
            name: code.into(),
            permission_type: PermissionType::Menu,
            parent_id: parent.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_code() {
        let svc = service().await;
        svc.create(create("order:create", None), "admin").await.unwrap();
        let err = svc.create(create("order:create", None), "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionCodeExists);
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let svc = service().await;
        let err = svc.create(create("", None), "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = svc.create(create("has space", None), "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_create_requires_live_parent() {
        let svc = service().await;
        let err = svc.create(create("a", Some("ghost")), "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionParentNotFound);

        let parent = svc.create(create("sys", None), "admin").await.unwrap();
        let child = svc.create(create("sys:user", Some(&parent.id)), "admin").await.unwrap();
        assert_eq!(child.parent_id, parent.id);

        svc.delete(&parent.id, "admin").await.unwrap();
        let err = svc.create(create("sys:role", Some(&parent.id)), "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionParentNotFound);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let svc = service().await;
        let err = svc.get_by_id("nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionNotFound);
        assert!(err.is_not_found());
        assert!(svc.get_by_code("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_cycles() {
        let svc = service().await;
        let a = svc.create(create("a", None), "admin").await.unwrap();
        let b = svc.create(create("b", Some(&a.id)), "admin").await.unwrap();
        let c = svc.create(create("c", Some(&b.id)), "admin").await.unwrap();

        // self-parenting
        let mut upd = PermissionUpdate::from(&a);
        upd.parent_id = a.id.clone();
        let err = svc.update(&a.id, upd, "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionCycle);

        // a under its grandchild
        let mut upd = PermissionUpdate::from(&a);
        upd.parent_id = c.id.clone();
        let err = svc.update(&a.id, upd, "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionCycle);

        // moving c to the root and then a under c is fine
        let mut upd = PermissionUpdate::from(&c);
        upd.parent_id = "0".into();
        svc.update(&c.id, upd, "admin").await.unwrap();
        let mut upd = PermissionUpdate::from(&a);
        upd.parent_id = c.id.clone();
        let moved = svc.update(&a.id, upd, "admin").await.unwrap();
        assert_eq!(moved.parent_id, c.id);
    }

    #[tokio::test]
    async fn test_update_code_collision() {
        let svc = service().await;
        svc.create(create("a", None), "admin").await.unwrap();
        let b = svc.create(create("b", None), "admin").await.unwrap();
        let mut upd = PermissionUpdate::from(&b);
        upd.code = "a".into();
        let err = svc.update(&b.id, upd, "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionCodeExists);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let svc = service().await;
        let a = svc.create(create("a", None), "admin").await.unwrap();
        let err = svc
            .update("ghost", PermissionUpdate::from(&a), "admin")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionNotFound);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let svc = service().await;
        let a = svc.create(create("a", None), "admin").await.unwrap();
        svc.delete(&a.id, "admin").await.unwrap();
        let err = svc.delete(&a.id, "admin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionNotFound);
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_parent_root_sentinels() {
        let svc = service().await;
        let sys = svc.create(create("sys", None), "admin").await.unwrap();
        svc.create(create("sys:user", Some(&sys.id)), "admin").await.unwrap();
        svc.create(create("home", Some("")), "admin").await.unwrap();

        assert_eq!(svc.list_by_parent("0").await.unwrap().len(), 2);
        assert_eq!(svc.list_by_parent("").await.unwrap().len(), 2);
        assert_eq!(svc.list_by_parent(&sys.id).await.unwrap().len(), 1);
    }
}
