use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::adapters::cache::CacheRegistry;
use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid page size bounds: min {min}, default {default}, max {max}. Need 0 < min <= default <= max")]
    InvalidPageBounds { min: i32, default: i32, max: i32 },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Unknown cache slot in policy_overrides: {0}")]
    UnknownCacheSlot(String),

    #[error("Default language cannot be empty")]
    EmptyDefaultLanguage,

    #[error("Absolute URL base cannot be empty")]
    EmptyAbsoluteUrlBase,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the working directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .sitecache/config.yaml
    /// 3. .sitecache/local.yaml (optional local overrides)
    /// 4. Environment variables (SITECACHE_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`load`](Self::load), reading `.sitecache/` under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(".sitecache");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("SITECACHE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let pages = &config.pagination;
        if pages.page_size_min <= 0
            || pages.page_size_min > pages.page_size_default
            || pages.page_size_default > pages.page_size_max
        {
            return Err(ConfigError::InvalidPageBounds {
                min: pages.page_size_min,
                default: pages.page_size_default,
                max: pages.page_size_max,
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if let Some(slot) = config
            .cache
            .policy_overrides
            .keys()
            .find(|name| !CacheRegistry::SLOT_NAMES.contains(&name.as_str()))
        {
            return Err(ConfigError::UnknownCacheSlot(slot.clone()));
        }

        if config.site.default_language.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultLanguage);
        }

        if config.site.absolute_url_base.trim().is_empty() {
            return Err(ConfigError::EmptyAbsoluteUrlBase);
        }

        Ok(())
    }
}
