//! Role Store

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Role, RoleCreate, RoleFilter, RoleUpdate};
use shared::request::PageQuery;
use shared::response::PageResult;

use crate::db::repository::{RepoError, Repository, RoleRepository};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_code, validate_optional_text, validate_required_text};

#[derive(Clone)]
pub struct RoleService {
    repo: RoleRepository,
}

pub(crate) fn role_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found")).with_detail("id", id)
}

fn code_exists(code: &str) -> AppError {
    AppError::with_message(ErrorCode::RoleCodeExists, format!("Role code '{code}' already exists"))
        .with_detail("code", code)
}

fn map_repo(err: RepoError, id: &str, code: &str) -> AppError {
    match err {
        RepoError::Duplicate(_) => code_exists(code),
        RepoError::NotFound(_) => role_not_found(id),
        other => other.into(),
    }
}

fn validate_fields(code: &str, name: &str, remark: &Option<String>) -> AppResult<()> {
    validate_code(code, "code")?;
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    validate_optional_text(remark, "remark", MAX_NOTE_LEN)?;
    Ok(())
}

impl RoleService {
    pub fn new(repo: RoleRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, data: RoleCreate, operator: &str) -> AppResult<Role> {
        validate_fields(&data.code, &data.name, &data.remark)?;
        if self.repo.find_by_code(&data.code).await?.is_some() {
            return Err(code_exists(&data.code));
        }
        let code = data.code.clone();
        let role = self
            .repo
            .create(data, operator)
            .await
            .map_err(|e| map_repo(e, "", &code))?;
        tracing::info!(id = %role.id, code = %role.code, operator = %operator, "Role created");
        Ok(role)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Role> {
        self.repo.find_by_id(id).await?.ok_or_else(|| role_not_found(id))
    }

    pub async fn get_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        Ok(self.repo.find_by_code(code).await?)
    }

    /// Live role or `RoleNotFound`; used as a guard before association writes
    pub async fn ensure_exists(&self, id: &str) -> AppResult<()> {
        self.get_by_id(id).await.map(|_| ())
    }

    pub async fn update(&self, id: &str, data: RoleUpdate, operator: &str) -> AppResult<Role> {
        validate_fields(&data.code, &data.name, &data.remark)?;
        if let Some(holder) = self.repo.find_by_code(&data.code).await?
            && holder.id != id
        {
            return Err(code_exists(&data.code));
        }
        let code = data.code.clone();
        let role = self
            .repo
            .update(id, data, operator)
            .await
            .map_err(|e| map_repo(e, id, &code))?;
        tracing::info!(id = %id, code = %role.code, operator = %operator, "Role updated");
        Ok(role)
    }

    /// Soft delete; the role's links stay but it no longer grants anything
    pub async fn delete(&self, id: &str, operator: &str) -> AppResult<()> {
        self.repo
            .delete(id, operator)
            .await
            .map_err(|e| map_repo(e, id, ""))?;
        tracing::info!(id = %id, operator = %operator, "Role deleted");
        Ok(())
    }

    pub async fn list_page(&self, filter: &RoleFilter, query: PageQuery) -> AppResult<PageResult<Role>> {
        Ok(self.repo.page(filter, query).await?)
    }
}
