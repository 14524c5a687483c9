use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::network::DEFAULT_API_BASE;
use crate::pipeline::PipelineConfig;

pub const CONFIG_ENV: &str = "DRACOR_CONFIG";
pub const METRICS_CSV_ENV: &str = "DRACOR_METRICS_CSV";
pub const API_BASE_ENV: &str = "DRACOR_API_BASE";
pub const BIND_ENV: &str = "DRACOR_BIND";
pub const MAX_NETWORK_PLAYS_ENV: &str = "DRACOR_MAX_NETWORK_PLAYS";

pub const DEFAULT_METRICS_CSV: &str = "results_columns_filtered-29-01-24.csv";
pub const DEFAULT_MAX_NETWORK_PLAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub metrics_csv: PathBuf,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub max_network_plays: usize,
    pub bind_address: String,
    pub log_json: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            metrics_csv: PathBuf::from(DEFAULT_METRICS_CSV),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
            max_network_plays: DEFAULT_MAX_NETWORK_PLAYS,
            bind_address: "0.0.0.0:3000".to_string(),
            log_json: false,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| PipelineError::Config(err.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then the TOML file (explicit path or `DRACOR_CONFIG`), then
    /// `DRACOR_*` environment variables. A `.env` file is honoured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match file {
            Some(file) => {
                debug!(path = %file.display(), "reading configuration file");
                Self::from_file(&file)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(METRICS_CSV_ENV) {
            self.metrics_csv = PathBuf::from(path);
        }
        if let Some(base) = lookup(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_address = bind;
        }
        if let Some(raw) = lookup(MAX_NETWORK_PLAYS_ENV) {
            self.max_network_plays = raw.trim().parse().map_err(|_| {
                PipelineError::Config(format!("{MAX_NETWORK_PLAYS_ENV} must be a number, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_network_plays == 0 {
            return Err(PipelineError::Config(
                "max_network_plays must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.api_base.trim().is_empty() {
            return Err(PipelineError::Config("api_base must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_network_plays: self.max_network_plays,
        }
    }
}
