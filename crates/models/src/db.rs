use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

// Outlives any process; the pool never reaps its only in-memory connection.
const KEEP_ALIVE: Duration = Duration::from_secs(u32::MAX as u64);

/// Pool options for the `[database]` section of the config.
///
/// SQLite in-memory databases live inside a single connection and vanish
/// with it, so those URLs get one connection that is never recycled. They
/// are meant for tests.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if cfg.url.contains(":memory:") {
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(KEEP_ALIVE)
            .max_lifetime(KEEP_ALIVE);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opt
}

/// Open a pooled connection using the `[database]` section of the config.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let opt = connect_options(cfg);
    let max_connections = opt.get_max_connections().unwrap_or_default();
    let db = Database::connect(opt).await?;
    info!(
        backend = ?db.get_database_backend(),
        max_connections,
        "database connected"
    );
    Ok(db)
}

/// Fresh, private SQLite database; each call yields an isolated store.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: IN_MEMORY_URL.to_string(), ..Default::default() };
    connect_with_config(&cfg).await
}
