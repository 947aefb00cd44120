//! Router configuration
//!
//! Values come from defaults, environment variables or a YAML document.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default configuration values
pub struct RouterDefaults;

impl RouterDefaults {
    pub const DETECT_DUPLICATES: bool = true;
    pub const CACHE_SYNTHESIZED_ROUTES: bool = true;
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Failed to parse router configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Router behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Reject routes whose path and methods collide with a registered route
    pub detect_duplicates: bool,
    /// Keep routes synthesized from matcher-only patterns for later lookups
    pub cache_synthesized_routes: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            detect_duplicates: RouterDefaults::DETECT_DUPLICATES,
            cache_synthesized_routes: RouterDefaults::CACHE_SYNTHESIZED_ROUTES,
        }
    }
}

impl RouterConfig {
    /// Read `ROUTER_DETECT_DUPLICATES` and `ROUTER_CACHE_SYNTHESIZED_ROUTES`
    pub fn from_env() -> Result<Self, ConfigError> {
        let detect_duplicates = bool_from_env(
            "ROUTER_DETECT_DUPLICATES",
            "detect_duplicates",
            RouterDefaults::DETECT_DUPLICATES,
        )?;

        let cache_synthesized_routes = bool_from_env(
            "ROUTER_CACHE_SYNTHESIZED_ROUTES",
            "cache_synthesized_routes",
            RouterDefaults::CACHE_SYNTHESIZED_ROUTES,
        )?;

        Ok(RouterConfig {
            detect_duplicates,
            cache_synthesized_routes,
        })
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Turn duplicate detection on or off
    pub fn with_duplicate_detection(mut self, enabled: bool) -> Self {
        self.detect_duplicates = enabled;
        self
    }
}

fn bool_from_env(key: &str, field: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            expected: "true or false".to_string(),
        }),
        Err(_) => Ok(default),
    }
}
