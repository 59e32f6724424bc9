//! Role Repository

use super::query::{Conditions, order_clause, push_page};
use super::{RepoError, RepoResult, Repository};
use shared::models::{Role, RoleCreate, RoleFilter, RoleUpdate};
use shared::request::PageQuery;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT: &str = "SELECT id, code, name, status, remark, created_at, created_by, updated_at, updated_by, deleted_at, deleted_by FROM role";

const ORDER_FIELDS: &[&str] = &["id", "code", "name", "status", "created_at", "updated_at"];

fn conditions(filter: &RoleFilter) -> Conditions {
    let mut c = Conditions::live();
    if let Some(code) = filter.code.as_deref().filter(|s| !s.is_empty()) {
        c.contains("code", code);
    }
    if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
        c.contains("name", name);
    }
    if let Some(status) = filter.status {
        c.eq_i64("status", status as i64);
    }
    c
}

fn duplicate_code(code: &str) -> impl FnOnce(sqlx::Error) -> RepoError + '_ {
    move |e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Role code '{code}' already exists")),
        other => other,
    }
}

#[derive(Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "{SELECT} WHERE code = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }
}

impl Repository<Role, RoleCreate, RoleUpdate, RoleFilter> for RoleRepository {
    async fn create(&self, data: RoleCreate, operator: &str) -> RepoResult<Role> {
        let id = shared::util::new_id();
        let now = shared::util::now_millis();

        sqlx::query(
            "INSERT INTO role (id, code, name, status, remark, created_at, created_by, updated_at, updated_by) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, ?7)",
        )
        .bind(&id)
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.status)
        .bind(&data.remark)
        .bind(now)
        .bind(operator)
        .execute(&self.pool)
        .await
        .map_err(duplicate_code(&data.code))?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create role".into()))
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "{SELECT} WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn find_by_id_unscoped(&self, id: &str) -> RepoResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!("{SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn update(&self, id: &str, data: RoleUpdate, operator: &str) -> RepoResult<Role> {
        let now = shared::util::now_millis();
        let rows = sqlx::query(
            "UPDATE role SET code = ?1, name = ?2, status = ?3, remark = ?4, updated_at = ?5, updated_by = ?6 WHERE id = ?7 AND deleted_at IS NULL",
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.status)
        .bind(&data.remark)
        .bind(now)
        .bind(operator)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(duplicate_code(&data.code))?;

        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Role {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
    }

    async fn delete(&self, id: &str, operator: &str) -> RepoResult<()> {
        let now = shared::util::now_millis();
        let rows = sqlx::query(
            "UPDATE role SET deleted_at = ?1, deleted_by = ?2 WHERE id = ?3 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(operator)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Role {id} not found")));
        }
        Ok(())
    }

    async fn count(&self, filter: &RoleFilter) -> RepoResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM role");
        conditions(filter).push_where(&mut qb);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list(&self, filter: &RoleFilter, query: &PageQuery) -> RepoResult<Vec<Role>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
        conditions(filter).push_where(&mut qb);
        qb.push(order_clause(&query.order, ORDER_FIELDS, "created_at ASC"));
        push_page(&mut qb, query);
        let rows = qb.build_query_as::<Role>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::Status;

    async fn repo() -> RoleRepository {
        let db = DbService::in_memory().await.unwrap();
        RoleRepository::new(db.pool)
    }

    fn create(code: &str) -> RoleCreate {
        RoleCreate {
            code: code.into(),
            name: format!("Role {code}"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo().await;
        let role = repo.create(create("admin"), "root").await.unwrap();
        assert_eq!(role.status, Status::Enabled);
        assert_eq!(role.created_by, "root");

        let by_code = repo.find_by_code("admin").await.unwrap().unwrap();
        assert_eq!(by_code.id, role.id);
    }

    #[tokio::test]
    async fn test_duplicate_code() {
        let repo = repo().await;
        repo.create(create("admin"), "root").await.unwrap();
        let err = repo.create(create("admin"), "root").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref m) if m.contains("admin")));
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let repo = repo().await;
        let role = repo.create(create("ops"), "root").await.unwrap();

        let mut upd = RoleUpdate::from(&role);
        upd.status = Status::Disabled;
        upd.remark = Some("paused".into());
        let updated = repo.update(&role.id, upd, "alice").await.unwrap();
        assert_eq!(updated.status, Status::Disabled);
        assert_eq!(updated.updated_by, "alice");
        assert_eq!(updated.created_by, "root");

        repo.delete(&role.id, "alice").await.unwrap();
        assert!(repo.find_by_id(&role.id).await.unwrap().is_none());
        assert!(repo.find_by_id_unscoped(&role.id).await.unwrap().is_some());
        assert!(matches!(
            repo.update(&role.id, RoleUpdate::from(&role), "alice").await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_page_by_name() {
        let repo = repo().await;
        for code in ["a", "b", "c"] {
            repo.create(create(code), "root").await.unwrap();
        }
        let filter = RoleFilter {
            name: Some("Role".into()),
            ..Default::default()
        };
        let page = repo.page(&filter, PageQuery::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
    }
}
