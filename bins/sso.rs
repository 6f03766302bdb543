use configs::{AppConfig, Environment};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(env: Environment) {
    match env {
        Environment::Local => common::utils::logging::init_logging_default("debug,tower_http=info,sqlx=warn"),
        Environment::Dev => common::utils::logging::init_logging_json("debug"),
        Environment::Prod => common::utils::logging::init_logging_json("info"),
    }
    info!(service = "sso", event = "logger_init", ?env, "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    // .env may carry CONFIG_PATH, DATABASE_URL and RUST_LOG
    dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e:#}");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_logging(cfg.env);
    // AppSeed redacts its secret in Debug output
    info!(service = "sso", event = "config_loaded", config = ?cfg, "configuration loaded");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "sso", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "sso", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "sso",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "sso service starting"
    );

    // server::run returns once SIGINT/SIGTERM drained in-flight requests
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "sso", event = "stop", %service_id, pid, "sso service stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "sso", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
