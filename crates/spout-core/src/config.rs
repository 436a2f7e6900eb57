//! Spout configuration.
//!
//! Sources, later ones win:
//! 1. built-in defaults
//! 2. an optional file (format picked from the extension: json / toml / yaml)
//! 3. environment variables prefixed `SPOUT_` (e.g. `SPOUT_TIMEOUT_SECONDS=60`)

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::domain::{DeactivateMode, SpoutError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoutConfig {
    /// Name used in logs and status.
    pub component_id: String,

    /// Sliding expiration window of pending tuples.
    pub timeout_seconds: u64,

    /// Assign delivery ids and track emissions until ack / fail.
    pub guaranteed_delivery: bool,

    pub deactivate_mode: DeactivateMode,

    /// Run a background sweep of expired pending tuples at this interval.
    pub sweep_interval_seconds: Option<u64>,
}

impl Default for SpoutConfig {
    fn default() -> Self {
        Self {
            component_id: "spout".to_string(),
            timeout_seconds: 30,
            guaranteed_delivery: false,
            deactivate_mode: DeactivateMode::default(),
            sweep_interval_seconds: None,
        }
    }
}

impl SpoutConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_seconds.map(Duration::from_secs)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, SpoutError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("SPOUT").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn from_json(json: &str) -> Result<Self, SpoutError> {
        let config = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
