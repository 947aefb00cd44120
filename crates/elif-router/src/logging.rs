//! Subscriber setup for binaries embedding the router
//!
//! The router only emits `tracing` events. Call [`init_logging`] once at
//! startup to see them.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::io;
use std::str::FromStr;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line human readable output
    #[default]
    Pretty,
    /// Single-line text
    Plain,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "plain" | "text" => Ok(LogFormat::Plain),
            _ => Err(ConfigError::InvalidValue {
                field: "log_format".to_string(),
                value: s.to_string(),
                expected: "json, pretty or plain".to_string(),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Plain => "plain",
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `elif_router=debug,tower=info`
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn production() -> Self {
        Self {
            filter: "elif_router=info,tower=warn,axum=warn".to_string(),
            format: LogFormat::Json,
        }
    }

    pub fn development() -> Self {
        Self {
            filter: "elif_router=debug,tower=debug,axum=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }

    /// Errors only
    pub fn test() -> Self {
        Self {
            filter: "elif_router=error".to_string(),
            format: LogFormat::Plain,
        }
    }

    /// Read `ROUTER_LOG` and `ROUTER_LOG_FORMAT` over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(filter) = env::var("ROUTER_LOG") {
            config.filter = filter;
        }
        if let Ok(format) = env::var("ROUTER_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install a global subscriber for `config`
///
/// `RUST_LOG` overrides the configured filter. Fails if the filter does not
/// parse or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(Layer::new().with_writer(io::stdout).json()).try_init()?,
        LogFormat::Pretty => registry.with(Layer::new().with_writer(io::stdout).pretty()).try_init()?,
        LogFormat::Plain => registry.with(Layer::new().with_writer(io::stdout)).try_init()?,
    }

    tracing::info!(
        target: "elif_router::logging",
        filter = %config.filter,
        format = %config.format,
        "Logging initialized"
    );
    Ok(())
}
