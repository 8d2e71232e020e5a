//! Structured logging setup.
//!
//! Everything in the crate logs through `tracing` with structured fields;
//! this module installs the subscriber that prints those events.
//!
//! ## Environment Variables
//!
//! - `ENDPOINTGEN_LOG_LEVEL` - trace/debug/info/warn/error (default `info`)
//! - `ENDPOINTGEN_LOG_FORMAT` - `json` or `pretty` (default `pretty`)
//! - `ENDPOINTGEN_LOG_TARGET_FILTER` - extra comma-separated filter
//!   directives, e.g. `endpointgen::parser=trace`
//!
//! `RUST_LOG`, when set, replaces the level entirely.
//!
//! Output goes to stderr so generated documents printed on stdout stay
//! machine-readable.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_LEVEL_ENV: &str = "ENDPOINTGEN_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "ENDPOINTGEN_LOG_FORMAT";
pub const LOG_TARGET_FILTER_ENV: &str = "ENDPOINTGEN_LOG_TARGET_FILTER";

/// Log format: JSON for log shippers, pretty-print for terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Module filter (comma-separated)
    pub target_filter: Option<String>,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string()),
            ),
            target_filter: env::var(LOG_TARGET_FILTER_ENV).ok(),
        }
    }

    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Builds the filter: `RUST_LOG` if set, else the configured level,
    /// plus any target directives.
    pub fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Initialize logging from `ENDPOINTGEN_LOG_*`.
///
/// Fails when a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
