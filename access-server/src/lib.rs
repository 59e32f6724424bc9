//! Access Server - RBAC 授权引擎
//!
//! # 架构概述
//!
//! - **权限目录** (`services::permission_service`): 层级权限的 CRUD 与软删除
//! - **通配匹配** (`auth::matcher`): 分段感知的 glob 权限匹配
//! - **权限树** (`auth::tree`): 扁平列表 → 森林
//! - **关联管理** (`services::association`): 事务内整体替换
//! - **授权查询** (`services::authorization`): 用户/角色可用权限
//!
//! # 模块结构
//!
//! ```text
//! access-server/src/
//! ├── core/          # 配置、状态
//! ├── auth/          # 匹配器、权限树
//! ├── services/      # 权限、角色、关联、授权
//! ├── utils/         # 日志、校验
//! └── db/            # SQLite 存储层
//! ```

pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{GrantedPermissions, PermissionMatcher};
pub use core::{Config, ServerState};
pub use db::DbService;
pub use services::{AssociationService, AuthorizationService, PermissionService, RoleService};
pub use shared::error::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 按配置初始化日志
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())
}
