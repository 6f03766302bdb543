use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize a compact, human readable subscriber on stdout.
/// - Respects `RUST_LOG` if set
/// - Falls back to `default_directive` (e.g. `debug,tower_http=info`)
pub fn init_logging_default(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize a subscriber emitting one JSON object per event on stdout.
/// - Respects `RUST_LOG` if set, otherwise uses `default_directive`
/// - Keeps span fields (email, app_id, user_id) on every event for log search
pub fn init_logging_json(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_current_span(true)
        .with_writer(io::stdout)
        .try_init();
}
