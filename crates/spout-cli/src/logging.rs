//! Logging setup for the CLI.
//!
//! - level filter from `RUST_LOG` (default `info`)
//! - `SPOUT_LOG_FORMAT=json` switches to JSON lines

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var("SPOUT_LOG_FORMAT").is_ok_and(|format| format == "json");

        let registry = tracing_subscriber::registry().with(filter);
        let result = if json {
            registry
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .try_init()
        };

        // 既に global subscriber があれば何もしない
        if result.is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
