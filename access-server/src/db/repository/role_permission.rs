//! Role ↔ Permission association rows
//!
//! Writers accept any executor: a pool for single statements, or
//! `&mut *tx` so a replace-all runs as one unit.

use super::RepoResult;
use shared::models::Permission;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

/// Delete every link for the role; returns the number of rows removed
pub async fn delete_by_role(conn: impl SqliteExecutor<'_>, role_id: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM role_permission WHERE role_id = ?")
        .bind(role_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}

/// Delete only the named links for the role
pub async fn delete_some(
    conn: impl SqliteExecutor<'_>,
    role_id: &str,
    permission_ids: &[String],
) -> RepoResult<u64> {
    if permission_ids.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM role_permission WHERE role_id = ");
    qb.push_bind(role_id.to_string());
    qb.push(" AND permission_id IN (");
    let mut sep = qb.separated(", ");
    for id in permission_ids {
        sep.push_bind(id.clone());
    }
    qb.push(")");
    let rows = qb.build().execute(conn).await?;
    Ok(rows.rows_affected())
}

/// Bulk insert links; ids must be distinct
pub async fn insert_many(
    conn: impl SqliteExecutor<'_>,
    role_id: &str,
    permission_ids: &[String],
) -> RepoResult<u64> {
    if permission_ids.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO role_permission (role_id, permission_id) ");
    qb.push_values(permission_ids, |mut row, permission_id| {
        row.push_bind(role_id.to_string()).push_bind(permission_id.clone());
    });
    let rows = qb.build().execute(conn).await?;
    Ok(rows.rows_affected())
}

/// Permission ids linked to the role, live permissions only
pub async fn find_permission_ids(pool: &SqlitePool, role_id: &str) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT rp.permission_id FROM role_permission rp \
         JOIN permission p ON p.id = rp.permission_id \
         WHERE rp.role_id = ? AND p.deleted_at IS NULL \
         ORDER BY p.sort ASC, p.id ASC",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Live permissions linked to the role, ordered by sort
pub async fn find_permissions(pool: &SqlitePool, role_id: &str) -> RepoResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.code, p.name, p.type, p.parent_id, p.path, p.icon, p.sort, p.status, p.remark, \
                p.created_at, p.created_by, p.updated_at, p.updated_by, p.deleted_at, p.deleted_by \
         FROM permission p \
         JOIN role_permission rp ON rp.permission_id = p.id \
         WHERE rp.role_id = ? AND p.deleted_at IS NULL \
         ORDER BY p.sort ASC, p.id ASC",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
