//! Source tracking for configuration values.

use std::fmt;
use std::path::PathBuf;

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default.
    Default,
    /// A TOML config file.
    File(PathBuf),
    /// An `LTR_*` environment variable.
    Environment(String),
    /// A command-line flag.
    CommandLine(String),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Environment(var) => write!(f, "env:{var}"),
            Self::CommandLine(flag) => write!(f, "cli:{flag}"),
        }
    }
}

/// A value together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    pub fn default_value(value: T) -> Self {
        Self::new(value, ConfigSource::Default)
    }

    pub fn from_env(value: T, var: impl Into<String>) -> Self {
        Self::new(value, ConfigSource::Environment(var.into()))
    }

    pub fn from_file(value: T, path: impl Into<PathBuf>) -> Self {
        Self::new(value, ConfigSource::File(path.into()))
    }

    pub fn from_cli(value: T, flag: impl Into<String>) -> Self {
        Self::new(value, ConfigSource::CommandLine(flag.into()))
    }

    pub fn is_from_env(&self) -> bool {
        matches!(self.source, ConfigSource::Environment(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            source: self.source,
        }
    }
}
