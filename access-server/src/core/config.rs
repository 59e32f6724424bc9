use crate::auth::PermissionMatcher;
use crate::auth::matcher::DEFAULT_SEPARATORS;

/// 服务配置 - 授权引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | ./data/access.db | SQLite 数据库文件 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | LOG_LEVEL | info | 默认日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | (无) | 滚动日志目录 |
/// | ENVIRONMENT | development | 运行环境 |
/// | PERMISSION_SEPARATORS | :/ | 权限码分段符 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_PATH=/data/rbac.db LOG_JSON=true cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 连接池最大连接数
    pub db_max_connections: u32,
    pub log_level: String,
    pub log_json: bool,
    /// 日志目录，未设置时仅输出到控制台
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 权限码分段符，`*` 和 `?` 不跨越这些字符
    pub permission_separators: Vec<char>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/access.db".into()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            permission_separators: std::env::var("PERMISSION_SEPARATORS")
                .ok()
                .map(|s| s.chars().collect::<Vec<_>>())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SEPARATORS.to_vec()),
        }
    }

    /// 使用自定义数据库路径覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_database(database_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config
    }

    /// 按配置的分段符构造匹配器
    pub fn matcher(&self) -> PermissionMatcher {
        PermissionMatcher::with_separators(self.permission_separators.iter().copied())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
