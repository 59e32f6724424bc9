use access_server::{Config, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env (可选)
    dotenvy::dotenv().ok();

    // 2. 加载配置并初始化日志
    let config = Config::from_env();
    setup_environment(&config)?;

    tracing::info!(environment = %config.environment, "Access server starting...");

    // 3. 初始化服务器状态 (数据库 + 服务)
    let state = ServerState::initialize(&config).await?;

    let permissions = state.permissions.list_all().await?;
    let tree = state.authorization.get_full_permission_tree().await?;
    tracing::info!(
        database = %config.database_path,
        permissions = permissions.len(),
        roots = tree.len(),
        separators = ?config.permission_separators,
        "Access server ready"
    );

    Ok(())
}
