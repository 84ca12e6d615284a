use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapters::cache::ErrorPolicy;

/// Main configuration structure for sitecache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Cache engine configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Page size bounds for list accessors
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Site identity
    #[serde(default)]
    pub site: SiteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cache engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// What a failed fetch leaves behind in its cell
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Per-slot overrides, keyed by registry slot name
    #[serde(default)]
    pub policy_overrides: BTreeMap<String, ErrorPolicy>,
}

impl CacheConfig {
    /// Policy for the registry slot `slot`.
    pub fn policy_for(&self, slot: &str) -> ErrorPolicy {
        self.policy_overrides
            .get(slot)
            .copied()
            .unwrap_or(self.error_policy)
    }
}

/// Page size bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationConfig {
    /// Page size used when the viewer has no preference
    #[serde(default = "default_page_size")]
    pub page_size_default: i32,

    #[serde(default = "default_page_size_min")]
    pub page_size_min: i32,

    #[serde(default = "default_page_size_max")]
    pub page_size_max: i32,
}

const fn default_page_size() -> i32 {
    15
}

const fn default_page_size_min() -> i32 {
    5
}

const fn default_page_size_max() -> i32 {
    50
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size_default: default_page_size(),
            page_size_min: default_page_size_min(),
            page_size_max: default_page_size_max(),
        }
    }
}

/// Site identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SiteConfig {
    /// Scheme and host prefixed to generated links
    #[serde(default = "default_absolute_url_base")]
    pub absolute_url_base: String,

    /// Language name used when the viewer has no preference
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_absolute_url_base() -> String {
    "http://localhost:8080".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            absolute_url_base: default_absolute_url_base(),
            default_language: default_language(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
