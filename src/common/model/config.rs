use crate::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_OUTPUT_PATH: &str = "./sunset_matches.txt";
pub const DEFAULT_LOOKUP_URL: &str = "https://api.sunrise-sunset.org";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Sunset lookup service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the service; `/json` is appended per request
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_URL.to_string(),
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<PathBuf>,
    pub console: bool,
    /// Emit JSON lines instead of the compact text format
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info,hyper=warn,reqwest=warn".to_string(),
            file_path: None,
            console: true,
            json: false,
        }
    }
}

/// Top-level pipeline configuration.
///
/// `Default` carries the fixed values the command line runs with; a TOML file
/// can override any subset of them when the pipeline is driven as a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub worker_count: usize,
    pub output_path: PathBuf,
    pub lookup: LookupConfig,
    pub log: LogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            lookup: LookupConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(config_str).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the pipeline cannot run with.
    ///
    /// Worker count is checked by the pipeline itself at startup, see
    /// [`crate::errors::PipelineError::InvalidWorkerCount`].
    pub fn validate(&self) -> Result<()> {
        if self.lookup.timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "lookup.timeout_secs",
            }
            .into());
        }
        Ok(())
    }
}
