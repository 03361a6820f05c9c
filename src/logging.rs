//! Structured logging setup.
//!
//! Every subsystem logs through `tracing`; this module installs the subscriber.
//! Output is JSON for production and pretty-printed for development, filtered by
//! `RUST_LOG` when set and by [`LogConfig::log_level`] otherwise.
//!
//! ## Environment Variables
//!
//! | variable                         | default | meaning                                  |
//! |----------------------------------|---------|------------------------------------------|
//! | `DECLAREST_LOG_LEVEL`            | `info`  | trace / debug / info / warn / error      |
//! | `DECLAREST_LOG_FORMAT`           | `json`  | `json` or `pretty`                       |
//! | `DECLAREST_LOG_TARGET_FILTER`    | unset   | extra comma-separated filter directives  |
//! | `DECLAREST_LOG_INCLUDE_LOCATION` | `false` | add file and line to every record        |
//! | `DECLAREST_LOG_ASYNC`            | `true`  | write through a non-blocking worker      |

use crate::runtime_config::parse_flag;
use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything but `pretty` means JSON.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives, comma-separated (e.g. `declarest::codec=debug`)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
    /// Write through a `tracing-appender` worker thread
    pub async_logging: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::default_prod()
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or malformed values keep
    /// the production default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default_prod();
        let flag = |name: &str, default: bool| {
            lookup(name)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default)
        };
        Self {
            log_level: lookup("DECLAREST_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("DECLAREST_LOG_FORMAT").map_or(defaults.format, |f| LogFormat::parse(&f)),
            target_filter: lookup("DECLAREST_LOG_TARGET_FILTER").filter(|f| !f.trim().is_empty()),
            include_location: flag("DECLAREST_LOG_INCLUDE_LOCATION", defaults.include_location),
            async_logging: flag("DECLAREST_LOG_ASYNC", defaults.async_logging),
        }
    }

    /// Verbose, pretty, synchronous.
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
            async_logging: false,
        }
    }

    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
            async_logging: true,
        }
    }

    /// The configured level; unknown names mean `INFO`.
    pub fn level(&self) -> Level {
        match self.log_level.trim().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(d) => filter = filter.add_directive(d),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Initialize logging at `log_level`, other settings from the environment.
///
/// # Errors
///
/// If a global subscriber is already installed.
pub fn init_logging(log_level: &str) -> Result<Option<WorkerGuard>> {
    let mut config = LogConfig::from_env();
    config.log_level = log_level.to_string();
    init_logging_with_config(&config)
}

/// Install the global subscriber.
///
/// With async logging the returned guard owns the writer thread; keep it alive
/// until exit or buffered records are lost.
///
/// ```no_run
/// use declarest::logging::{init_logging_with_config, LogConfig};
///
/// let _guard = init_logging_with_config(&LogConfig::from_env())
///     .expect("Failed to initialize logging");
/// ```
///
/// # Errors
///
/// If a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
