pub mod api;
pub mod client;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::{ConfigResolver, ScriptProperties, ServerConfig};
use state::AppState;
use storage::{MemoryWorkbook, PgWorkbook};

/// 初始化日志，过滤规则取自环境变量 `SHEETCMS_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("SHEETCMS_LOG"))
        .init();
}

/// 启动后端服务
///
/// 设置了 `DATABASE_URL` 时使用 Postgres 存储，否则使用进程内存储并自动建表。
pub async fn run() -> error::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env();
    let resolver = ConfigResolver::standard(ScriptProperties::from_env());

    match config.database_url.clone() {
        Some(url) => {
            let pool = storage::new_db_pool(&url).await?;
            storage::migrate(&pool, storage::SCHEMA).await?;
            let app = AppState::new(PgWorkbook::new(pool), resolver, config);
            api::run_server(app).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data lives in memory only");
            let workbook = MemoryWorkbook::new();
            storage::setup(&workbook).await?;
            let app = AppState::new(workbook, resolver, config);
            api::run_server(app).await
        }
    }
}
