use dotenvy::dotenv;
use reminder_backend::{
    build_router, config::AppConfig, connect_pool, cors_layer, services::schema, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 1. 初始化环境变量与日志
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "提醒服务启动中... 当前级别: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );

    if let Err(e) = run().await {
        tracing::error!("服务启动失败: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 2. 加载配置
    let config = AppConfig::from_env()?;

    // 3. 初始化数据库连接池并自动建表
    let pool = connect_pool(&config).await?;
    schema::ensure_schema(&pool).await?;

    // 4. 组装路由
    let state = Arc::new(AppState::new(pool, &config));
    let app = build_router(state).layer(cors_layer(config.cors_allowed_origin.as_deref()));

    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    tracing::info!("🚀 Server deployed successfully at http://{}", config.server_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
