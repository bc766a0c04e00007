//! Tracing bootstrap. Logs go to stderr; stdout carries outbound events.

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,lobbychat_client=debug";

/// Initialize the global tracing subscriber.
///
/// Precedence:
/// 1) `RUST_LOG`
/// 2) `LOBBYCHAT_LOG`
/// 3) internal default filter
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(io::stderr)
        .with_env_filter(filter_from_env())
        .try_init();
}

fn filter_from_env() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let custom = env::var("LOBBYCHAT_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok());
    if let Some(filter) = custom {
        return filter;
    }

    EnvFilter::new(DEFAULT_FILTER)
}
