//! stackmon.toml configuration.
//!
//! Defaults are overlaid by an optional TOML file, then by `STACKMON_*`
//! environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_VENDOR_BASE_URL: &str = "STACKMON_VENDOR_BASE_URL";
pub const ENV_SECRET_NAME: &str = "STACKMON_SECRET_NAME";
pub const ENV_SECRET_REGION: &str = "STACKMON_SECRET_REGION";
pub const ENV_DRY_RUN: &str = "STACKMON_DRY_RUN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub vendor: VendorConfig,
    pub secrets: SecretsConfig,
    /// Log planned creates and deletes without calling the vendor.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub base_url: String,
    /// Agents that run newly created tests.
    pub agent_ids: Vec<u64>,
    /// Test interval in seconds.
    pub interval: u32,
    pub content_regex: String,
    pub timeout_secs: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thousandeyes.com/v6".to_string(),
            agent_ids: vec![14410],
            interval: 60,
            content_regex: "someregex".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub name: String,
    pub region: String,
    pub version_stage: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            name: "some-api".to_string(),
            region: "us-west-2".to_string(),
            version_stage: "AWSCURRENT".to_string(),
        }
    }
}

impl ReconcilerConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(url) = lookup(ENV_VENDOR_BASE_URL) {
            self.vendor.base_url = url;
        }
        if let Some(name) = lookup(ENV_SECRET_NAME) {
            self.secrets.name = name;
        }
        if let Some(region) = lookup(ENV_SECRET_REGION) {
            self.secrets.region = region;
        }
        if let Some(flag) = lookup(ENV_DRY_RUN) {
            self.dry_run = parse_flag(&flag)
                .ok_or_else(|| ConfigError::Invalid(format!("{ENV_DRY_RUN}={flag:?} is not a boolean")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.vendor.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("vendor.base_url is empty".to_string()));
        }
        if self.vendor.agent_ids.is_empty() {
            return Err(ConfigError::Invalid("vendor.agent_ids is empty".to_string()));
        }
        if self.vendor.interval == 0 {
            return Err(ConfigError::Invalid("vendor.interval must be positive".to_string()));
        }
        if self.secrets.name.is_empty() {
            return Err(ConfigError::Invalid("secrets.name is empty".to_string()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
