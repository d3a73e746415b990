//! Log subscriber setup: `RUST_LOG` filter, JSON output when `LOG_FORMAT=json`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "kitchkatch=debug,kitchkatch_server=debug,tower_http=info";

pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
