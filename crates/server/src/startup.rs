use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, AppSeed, ServerConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::routes::{self, auth::ServerState};
use service::auth::{repo::seaorm::SeaOrmCredentialStore, AuthConfig, AuthService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Insert or refresh the operator-provisioned apps from configuration.
pub async fn provision_apps(db: &DatabaseConnection, apps: &[AppSeed]) -> anyhow::Result<()> {
    for app in apps {
        models::app::upsert(db, app.id, &app.name, &app.secret).await?;
        info!(app_id = app.id, name = %app.name, "app provisioned");
    }
    Ok(())
}

/// Connect the store, migrate it, provision apps and wire the auth service.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    provision_apps(&db, &cfg.apps).await?;

    let store = Arc::new(SeaOrmCredentialStore::new(db));
    let svc = AuthService::new(store, AuthConfig::from_settings(&cfg.auth));
    Ok(ServerState { auth: Arc::new(svc) })
}

pub fn build_app(cfg: &AppConfig, state: ServerState) -> Router {
    routes::build_router(state, build_cors(), cfg.server.request_timeout())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal, "application is stopping");
}

/// Public entry: build the app and serve until SIGINT/SIGTERM.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_app(&cfg, state);

    let addr = load_bind_addr(&cfg.server)?;
    info!(%addr, "starting sso server");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("application is stopped");
    Ok(())
}
