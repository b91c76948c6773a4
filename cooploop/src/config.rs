//! cooploop configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::scheduler::SchedulerConfig;
use crate::timing::Tolerance;

/// Main cooploop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Scheduler settings
    pub scheduler: SchedulerConfig,

    /// Scenario unit conversion and checking
    pub scenario: ScenarioConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        match Self::load_first(&Self::search_paths()) {
            Some(config) => Ok(config),
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Implicit config locations, highest priority first
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".cooploop.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cooploop").join("cooploop.yml"));
        }
        paths
    }

    /// First existing file that parses; broken ones are skipped with a warning
    fn load_first(paths: &[PathBuf]) -> Option<Self> {
        paths
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| match Self::load_from_file(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config::load_first: skipping");
                    None
                }
            })
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full `load` reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Length of one scenario time unit in milliseconds
    #[serde(rename = "time-unit-ms")]
    pub time_unit_ms: u64,

    /// Allowed drift between measured and expected elapsed time
    #[serde(rename = "tolerance-ms")]
    pub tolerance_ms: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: 1000,
            tolerance_ms: 100,
        }
    }
}

impl ScenarioConfig {
    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::from_millis(self.tolerance_ms)
    }
}
