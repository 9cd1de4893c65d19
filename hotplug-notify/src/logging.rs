//! Logging setup for the hotplug-notify binary
//!
//! Event summaries are the program's output and go to stdout. Everything logged through
//! `tracing` goes to stderr, so the two never interleave in a pipe or in the journal.

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "HOTPLUG_LOG_MODE";

/// Environment variable overriding the log level or filter directives
pub const LOG_LEVEL_ENV: &str = "HOTPLUG_LOG_LEVEL";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact lines without colours or timestamps, for the systemd journal
    Service,
    /// Compact coloured stderr output
    Development,
    /// Verbose diagnostics with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "service" => Ok(LoggingMode::Service),
            "development" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidEnv(format!(
                "{}={} (expected silent, service, development or debug)",
                LOG_MODE_ENV, other
            ))),
        }
    }
}

/// Initialize logging with the specified mode
///
/// `default_level` applies when neither `HOTPLUG_LOG_LEVEL` nor `RUST_LOG` is set.
pub fn init_logging(mode: LoggingMode, default_level: &str) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = create_env_filter(default_level);

    let result = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Service => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .without_time()
                    .with_target(false)
                    .compact(),
            )
            .with(filter)
            .try_init(),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .with(filter)
            .try_init(),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .pretty()
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Initialize logging from `HOTPLUG_LOG_MODE`
///
/// Defaults to Development when the variable is unset.
pub fn init_logging_from_env(default_level: &str) -> Result<LoggingMode, LoggingError> {
    let mode = mode_from_env(std::env::var(LOG_MODE_ENV).ok().as_deref())?;
    init_logging(mode, default_level)?;
    Ok(mode)
}

fn mode_from_env(value: Option<&str>) -> Result<LoggingMode, LoggingError> {
    match value {
        None | Some("") => Ok(LoggingMode::Development),
        Some(value) => value.parse(),
    }
}

/// Create an environment filter with fallback to default level
fn create_env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::new(filter_directives(
        std::env::var(LOG_LEVEL_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        default_level,
    ))
}

// HOTPLUG_LOG_LEVEL, then RUST_LOG, then the default
fn filter_directives(
    hotplug_level: Option<String>,
    rust_log: Option<String>,
    default_level: &str,
) -> String {
    hotplug_level
        .filter(|v| !v.is_empty())
        .or_else(|| rust_log.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| default_level.to_string())
}
