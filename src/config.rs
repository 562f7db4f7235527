use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Environment variables with this prefix override file settings,
/// e.g. `NETMON_DASH_API_URL`.
pub const ENV_PREFIX: &str = "NETMON_DASH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_url: String,
    pub refresh_interval_ms: u64,
    pub toast_duration_ms: u64,
    pub events_limit: usize,
    /// Absent means no timeout beyond what the transport imposes.
    pub request_timeout_ms: Option<u64>,
    /// Discard responses older than the newest one already applied.
    pub drop_stale_responses: bool,
    /// Let a click outside the device modal close it while it is still loading.
    pub close_modal_while_loading: bool,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            refresh_interval_ms: 5000,
            toast_duration_ms: 3000,
            events_limit: 20,
            request_timeout_ms: None,
            drop_stale_responses: false,
            close_modal_while_loading: false,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    fn validate(self) -> Result<Self> {
        if self.refresh_interval_ms == 0 {
            return Err(anyhow::anyhow!("refresh_interval_ms must be greater than zero"));
        }
        if self.events_limit == 0 {
            return Err(anyhow::anyhow!("events_limit must be greater than zero"));
        }
        Ok(self)
    }
}

/// Defaults, then the optional file, then `NETMON_DASH_*` variables.
pub fn load_config(path: Option<&str>) -> Result<DashboardConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path));
    }
    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    config.try_deserialize::<DashboardConfig>()?.validate()
}
