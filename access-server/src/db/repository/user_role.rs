//! User ↔ Role association rows
//!
//! Rows are removed physically; `deleted_at` is honoured on reads so rows
//! revoked by another writer of the same schema stay invisible.

use super::RepoResult;
use shared::models::{Permission, Role, UserRole};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

pub async fn delete_by_user(conn: impl SqliteExecutor<'_>, user_id: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM user_role WHERE user_id = ?")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}

/// Bulk insert grants stamped with the operator; ids must be distinct
pub async fn insert_many(
    conn: impl SqliteExecutor<'_>,
    user_id: &str,
    role_ids: &[String],
    operator: &str,
) -> RepoResult<u64> {
    if role_ids.is_empty() {
        return Ok(0);
    }
    let now = shared::util::now_millis();
    let mut qb =
        QueryBuilder::<Sqlite>::new("INSERT INTO user_role (user_id, role_id, created_by, created_at) ");
    qb.push_values(role_ids, |mut row, role_id| {
        row.push_bind(user_id.to_string())
            .push_bind(role_id.clone())
            .push_bind(operator.to_string())
            .push_bind(now);
    });
    let rows = qb.build().execute(conn).await?;
    Ok(rows.rows_affected())
}

/// Single-statement removal of one grant
pub async fn delete_one(
    conn: impl SqliteExecutor<'_>,
    user_id: &str,
    role_id: &str,
) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM user_role WHERE user_id = ? AND role_id = ?")
        .bind(user_id)
        .bind(role_id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}

/// Single-statement removal of several grants
pub async fn delete_some(
    conn: impl SqliteExecutor<'_>,
    user_id: &str,
    role_ids: &[String],
) -> RepoResult<u64> {
    if role_ids.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM user_role WHERE user_id = ");
    qb.push_bind(user_id.to_string());
    qb.push(" AND role_id IN (");
    let mut sep = qb.separated(", ");
    for id in role_ids {
        sep.push_bind(id.clone());
    }
    qb.push(")");
    let rows = qb.build().execute(conn).await?;
    Ok(rows.rows_affected())
}

/// Raw grant rows for the user
pub async fn find_by_user(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<UserRole>> {
    let rows = sqlx::query_as::<_, UserRole>(
        "SELECT user_id, role_id, created_by, created_at, deleted_at FROM user_role \
         WHERE user_id = ? AND deleted_at IS NULL ORDER BY created_at ASC, role_id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Live roles granted to the user
pub async fn find_roles(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<Role>> {
    let rows = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.code, r.name, r.status, r.remark, r.created_at, r.created_by, \
                r.updated_at, r.updated_by, r.deleted_at, r.deleted_by \
         FROM role r \
         JOIN user_role ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? AND ur.deleted_at IS NULL AND r.deleted_at IS NULL \
         ORDER BY ur.created_at ASC, r.id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Users holding the role
pub async fn find_user_ids(pool: &SqlitePool, role_id: &str) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT user_id FROM user_role WHERE role_id = ? AND deleted_at IS NULL ORDER BY user_id ASC",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Distinct live permissions reachable user → role → permission.
///
/// With `enabled_only`, disabled roles and disabled permissions are skipped.
pub async fn find_permissions(
    pool: &SqlitePool,
    user_id: &str,
    enabled_only: bool,
) -> RepoResult<Vec<Permission>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT p.id, p.code, p.name, p.type, p.parent_id, p.path, p.icon, p.sort, p.status, p.remark, \
                p.created_at, p.created_by, p.updated_at, p.updated_by, p.deleted_at, p.deleted_by \
         FROM permission p \
         WHERE p.deleted_at IS NULL AND p.id IN (\
             SELECT rp.permission_id FROM role_permission rp \
             JOIN role r ON r.id = rp.role_id \
             JOIN user_role ur ON ur.role_id = r.id \
             WHERE ur.user_id = ",
    );
    qb.push_bind(user_id.to_string());
    qb.push(" AND ur.deleted_at IS NULL AND r.deleted_at IS NULL");
    if enabled_only {
        qb.push(" AND r.status = 1");
    }
    qb.push(")");
    if enabled_only {
        qb.push(" AND p.status = 1");
    }
    qb.push(" ORDER BY p.sort ASC, p.id ASC");
    let rows = qb.build_query_as::<Permission>().fetch_all(pool).await?;
    Ok(rows)
}
