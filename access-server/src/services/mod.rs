//! 服务层 - RBAC 核心服务
//!
//! # 服务列表
//!
//! - [`PermissionService`] - 权限目录 CRUD（软删除、层级校验）
//! - [`RoleService`] - 角色 CRUD
//! - [`AssociationService`] - 角色/权限、用户/角色关联的整体替换
//! - [`AuthorizationService`] - 授权查询与权限树

pub mod association;
pub mod authorization;
pub mod permission_service;
pub mod role_service;

pub use association::AssociationService;
pub use authorization::AuthorizationService;
pub use permission_service::PermissionService;
pub use role_service::RoleService;
