use std::path::Path;

use shared::error::{AppError, AppResult};

use crate::auth::PermissionMatcher;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{PermissionRepository, RoleRepository};
use crate::services::{AssociationService, AuthorizationService, PermissionService, RoleService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 每个服务在构造时获得连接池的克隆 (SqlitePool 内部为 Arc)，
/// 没有全局单例。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | permissions | PermissionService | 权限目录 |
/// | roles | RoleService | 角色 |
/// | associations | AssociationService | 关联整体替换 |
/// | authorization | AuthorizationService | 授权查询 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let allowed = state
///     .authorization
///     .check_user_permission("u1", "order:create")
///     .await?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub permissions: PermissionService,
    pub roles: RoleService,
    pub associations: AssociationService,
    pub authorization: AuthorizationService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库目录
    /// 2. 数据库连接池与迁移
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!("Cannot create database directory {}: {e}", parent.display()))
            })?;
        }

        let db = DbService::new(&config.database_path, config.db_max_connections).await?;
        Ok(Self::from_db(config.clone(), db, config.matcher()))
    }

    /// 由已打开的数据库构造 (测试使用内存库)
    pub fn from_db(config: Config, db: DbService, matcher: PermissionMatcher) -> Self {
        let pool = db.pool.clone();
        let roles = RoleService::new(RoleRepository::new(pool.clone()));
        Self {
            permissions: PermissionService::new(PermissionRepository::new(pool.clone())),
            associations: AssociationService::new(pool.clone(), roles.clone()),
            authorization: AuthorizationService::new(pool, matcher),
            roles,
            db,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("access.db");
        let config = Config::with_database(path.to_string_lossy());

        let state = ServerState::initialize(&config).await.unwrap();
        assert!(path.exists());
        assert!(state.permissions.list_all().await.unwrap().is_empty());
    }
}
