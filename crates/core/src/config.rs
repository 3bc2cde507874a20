//! Configuration management
//!
//! Loads and saves the optional spa-deployer configuration file. The file is
//! stored in TOML format at `<config dir>/spa-deployer/config.toml`, or under
//! `$SPA_DEPLOY_CONFIG_DIR` when that variable is set.
//!
//! Files written with an older `schema_version` are upgraded on load; files
//! from a newer release are rejected.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "SPA_DEPLOY_CONFIG_DIR";

/// Region used when neither a flag nor the config file names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Build directory used when neither a flag nor the config file names one
pub const DEFAULT_DIST_DIR: &str = "./dist";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Regions accepted as-is even though they fail validation
    #[serde(default)]
    pub accepted_regions: Vec<String>,
}

/// Fallback values for flags left unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_dist_dir() -> String {
    DEFAULT_DIST_DIR.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: default_region(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            accepted_regions: Vec::new(),
        }
    }
}

impl Config {
    pub fn is_region_accepted(&self, region: &str) -> bool {
        self.accepted_regions.iter().any(|r| r == region)
    }

    /// Record regions the user asked not to be questioned about again
    ///
    /// Returns true when anything new was added.
    pub fn accept_regions<'a>(&mut self, regions: impl IntoIterator<Item = &'a String>) -> bool {
        let mut changed = false;
        for region in regions {
            if !self.is_region_accepted(region) {
                self.accepted_regions.push(region.clone());
                changed = true;
            }
        }
        changed
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("spa-deployer"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade spa-deploy.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk, creating parent directories as needed
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        tracing::debug!("Saved configuration to {}", self.config_path.display());

        Ok(())
    }

    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
