//! Logging setup shared by the binary.
//!
//! ```ignore
//! let log_config = LogConfig::from_env("info").with_stderr();
//! let _logging_guards = init_logging(&log_config)?;
//! ```
//!
//! Console output goes to stdout or stderr in `pretty`, `compact` or `json`
//! form. When `LTR_LOG_DIR` is set, a daily rolling JSON log file is written
//! through a non-blocking writer; its guard lives in [`LoggingGuards`].

use crate::config::EnvParser;
use crate::errors::{Catalogued, ErrorCode};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// File name prefix for the rolling log file.
pub const LOG_FILE_PREFIX: &str = "ltr.log";

/// Console log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("failed to create log directory {}: {source}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install global subscriber: {0}")]
    Init(String),
}

impl Catalogued for LoggingError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InternalLoggingError
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `ltr=debug,ltr_common=trace`.
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub stderr: bool,
}

impl LogConfig {
    /// Reads `LTR_LOG_LEVEL`, `LTR_LOG_FORMAT` and `LTR_LOG_DIR`.
    ///
    /// Invalid values fall back to defaults; logging is not ready yet to
    /// report them, so they are dropped silently.
    pub fn from_env(default_level: &str) -> Self {
        let mut parser = EnvParser::new();
        let level = parser.get_log_level("LOG_LEVEL", default_level).value;
        let format = parser
            .get_choice("LOG_FORMAT", "pretty", &["pretty", "compact", "json"])
            .value
            .parse()
            .unwrap_or_default();
        let log_dir = parser.get_optional_path("LOG_DIR").value;

        Self {
            level,
            format,
            log_dir,
            stderr: false,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.log_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Send console output to stderr, keeping stdout for command output.
    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }
}

/// Keeps background log writers alive. Drop at the end of `main`.
#[must_use = "dropping the guards stops file logging"]
pub struct LoggingGuards {
    _file_guard: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn console_layer(config: &LogConfig) -> BoxedLayer {
    match (config.format, config.stderr) {
        (LogFormat::Pretty, true) => fmt::layer().with_writer(std::io::stderr).pretty().boxed(),
        (LogFormat::Pretty, false) => fmt::layer().pretty().boxed(),
        (LogFormat::Compact, true) => fmt::layer().with_writer(std::io::stderr).compact().boxed(),
        (LogFormat::Compact, false) => fmt::layer().compact().boxed(),
        (LogFormat::Json, true) => fmt::layer().with_writer(std::io::stderr).json().boxed(),
        (LogFormat::Json, false) => fmt::layer().json().boxed(),
    }
}

/// Installs the global subscriber.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuards, LoggingError> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
            directive: config.level.clone(),
            message: e.to_string(),
        })?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config)];
    let mut file_guard = None;

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
            path: dir.clone(),
            source,
        })?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
        );
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuards {
        _file_guard: file_guard,
    })
}
