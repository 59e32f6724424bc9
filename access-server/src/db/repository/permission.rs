//! Permission Repository

use super::query::{Conditions, order_clause, push_page};
use super::{RepoError, RepoResult, Repository};
use shared::models::{
    Permission, PermissionCreate, PermissionFilter, PermissionType, PermissionUpdate,
    ROOT_PARENT_ID, is_root_parent,
};
use shared::request::PageQuery;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT: &str = "SELECT id, code, name, type, parent_id, path, icon, sort, status, remark, created_at, created_by, updated_at, updated_by, deleted_at, deleted_by FROM permission";

/// Columns callers may order by
const ORDER_FIELDS: &[&str] = &[
    "id", "code", "name", "type", "parent_id", "sort", "status", "created_at", "updated_at",
];

const DEFAULT_ORDER: &str = "sort ASC";

/// Store the root sentinel in one spelling
fn normalize_parent(parent_id: Option<&str>) -> String {
    match parent_id {
        Some(p) if !is_root_parent(p) => p.to_string(),
        _ => ROOT_PARENT_ID.to_string(),
    }
}

fn conditions(filter: &PermissionFilter) -> Conditions {
    let mut c = Conditions::live();
    if let Some(code) = filter.code.as_deref().filter(|s| !s.is_empty()) {
        c.contains("code", code);
    }
    if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
        c.contains("name", name);
    }
    if let Some(t) = filter.permission_type {
        c.eq_text("type", type_str(t));
    }
    if let Some(parent) = filter.parent_id.as_deref() {
        if is_root_parent(parent) {
            c.raw("parent_id IN ('', '0')");
        } else {
            c.eq_text("parent_id", parent);
        }
    }
    if let Some(status) = filter.status {
        c.eq_i64("status", status as i64);
    }
    c
}

fn type_str(t: PermissionType) -> &'static str {
    match t {
        PermissionType::Menu => "menu",
        PermissionType::Api => "api",
    }
}

#[derive(Clone)]
pub struct PermissionRepository {
    pool: SqlitePool,
}

impl PermissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Live permission with this code, if any
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Permission>> {
        let p = sqlx::query_as::<_, Permission>(&format!(
            "{SELECT} WHERE code = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(p)
    }

    /// Direct children of `parent_id`, ordered by sort.
    ///
    /// A root sentinel returns the top-level permissions.
    pub async fn find_by_parent(&self, parent_id: &str) -> RepoResult<Vec<Permission>> {
        let filter = PermissionFilter {
            parent_id: Some(parent_id.to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
        conditions(&filter).push_where(&mut qb);
        qb.push(order_clause(&[], ORDER_FIELDS, DEFAULT_ORDER));
        let rows = qb.build_query_as::<Permission>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Every live permission, ordered by sort
    pub async fn find_all(&self) -> RepoResult<Vec<Permission>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
        Conditions::live().push_where(&mut qb);
        qb.push(order_clause(&[], ORDER_FIELDS, DEFAULT_ORDER));
        let rows = qb.build_query_as::<Permission>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Live permissions among `ids`, ordered by sort
    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
        Conditions::live().push_where(&mut qb);
        qb.push(" AND id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(id.clone());
        }
        qb.push(")");
        qb.push(order_clause(&[], ORDER_FIELDS, DEFAULT_ORDER));
        let rows = qb.build_query_as::<Permission>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

impl Repository<Permission, PermissionCreate, PermissionUpdate, PermissionFilter>
    for PermissionRepository
{
    async fn create(&self, data: PermissionCreate, operator: &str) -> RepoResult<Permission> {
        let id = shared::util::new_id();
        let now = shared::util::now_millis();
        let parent_id = normalize_parent(data.parent_id.as_deref());

        sqlx::query(
            "INSERT INTO permission (id, code, name, type, parent_id, path, icon, sort, status, remark, created_at, created_by, updated_at, updated_by) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?11, ?12)",
        )
        .bind(&id)
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.permission_type)
        .bind(&parent_id)
        .bind(&data.path)
        .bind(&data.icon)
        .bind(data.sort)
        .bind(data.status)
        .bind(&data.remark)
        .bind(now)
        .bind(operator)
        .execute(&self.pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Permission code '{}' already exists", data.code))
            }
            other => other,
        })?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create permission".into()))
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Permission>> {
        let p = sqlx::query_as::<_, Permission>(&format!(
            "{SELECT} WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(p)
    }

    async fn find_by_id_unscoped(&self, id: &str) -> RepoResult<Option<Permission>> {
        let p = sqlx::query_as::<_, Permission>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(p)
    }

    async fn update(
        &self,
        id: &str,
        data: PermissionUpdate,
        operator: &str,
    ) -> RepoResult<Permission> {
        let now = shared::util::now_millis();
        let parent_id = normalize_parent(Some(&data.parent_id));

        let rows = sqlx::query(
            "UPDATE permission SET code = ?1, name = ?2, type = ?3, parent_id = ?4, path = ?5, icon = ?6, sort = ?7, status = ?8, remark = ?9, updated_at = ?10, updated_by = ?11 WHERE id = ?12 AND deleted_at IS NULL",
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.permission_type)
        .bind(&parent_id)
        .bind(&data.path)
        .bind(&data.icon)
        .bind(data.sort)
        .bind(data.status)
        .bind(&data.remark)
        .bind(now)
        .bind(operator)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Permission code '{}' already exists", data.code))
            }
            other => other,
        })?;

        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Permission {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Permission {id} not found")))
    }

    async fn delete(&self, id: &str, operator: &str) -> RepoResult<()> {
        let now = shared::util::now_millis();
        let rows = sqlx::query(
            "UPDATE permission SET deleted_at = ?1, deleted_by = ?2 WHERE id = ?3 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(operator)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Permission {id} not found")));
        }
        Ok(())
    }

    async fn count(&self, filter: &PermissionFilter) -> RepoResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM permission");
        conditions(filter).push_where(&mut qb);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list(&self, filter: &PermissionFilter, query: &PageQuery) -> RepoResult<Vec<Permission>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
        conditions(filter).push_where(&mut qb);
        qb.push(order_clause(&query.order, ORDER_FIELDS, DEFAULT_ORDER));
        push_page(&mut qb, query);
        let rows = qb.build_query_as::<Permission>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
