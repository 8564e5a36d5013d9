//! Logger initialization built on tracing-subscriber.
//!
//! Configured from [`LoggerSettings`]: level, output format, and console
//! options. Returns a handle that can change the level at runtime.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};

use crate::config::settings::LoggerSettings;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("invalid log format '{0}'. Valid formats are: full, compact, json")]
    InvalidFormat(String),

    #[error("logger already initialized")]
    AlreadyInitialized,

    #[error("failed to reload log level")]
    ReloadFailed,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggerError::InvalidFormat(other.to_string())),
        }
    }
}

/// Handle for changing the active log level after initialization.
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = build_filter(level)?;
        self.handle
            .reload(filter)
            .map_err(|_| LoggerError::ReloadFailed)
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLevel(level.to_string()))
}

/// Initializes the global tracing subscriber from logger settings.
///
/// May be called once per process; subsequent calls fail with
/// `AlreadyInitialized`.
pub fn init_logger(settings: &LoggerSettings) -> Result<LogLevelHandle, LoggerError> {
    let filter = build_filter(&settings.level)?;
    let (filter_layer, handle) = reload::Layer::new(filter);

    let fmt_layer = if settings.console.enabled {
        let format: LogFormat = settings.format.parse()?;
        let layer = match format {
            LogFormat::Full => fmt::layer().with_ansi(settings.console.colored).boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_ansi(settings.console.colored)
                .boxed(),
            LogFormat::Json => fmt::layer().json().with_ansi(false).boxed(),
        };
        Some(layer)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    Ok(LogLevelHandle { handle })
}
