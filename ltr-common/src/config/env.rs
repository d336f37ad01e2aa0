//! Environment variable parsing with type safety.
//!
//! Every variable is read with an `LTR_` prefix. Invalid values are recorded
//! instead of aborting, so that all problems can be reported at once.

use super::source::Sourced;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Path does not exist.
    #[error("Path not found for {var}: {}", path.display())]
    PathNotFound { var: String, path: PathBuf },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Type-safe environment variable parser.
pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a new parser with the LTR_ prefix.
    pub fn new() -> Self {
        Self {
            prefix: "LTR_",
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Get a string value with default.
    pub fn get_string(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => Sourced::from_env(value, var_name),
            Err(_) => Sourced::default_value(default.to_string()),
        }
    }

    /// Get one of a fixed set of lowercase values.
    pub fn get_choice(&mut self, name: &str, default: &str, allowed: &[&str]) -> Sourced<String> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => {
                let lower = value.trim().to_lowercase();
                if allowed.contains(&lower.as_str()) {
                    Sourced::from_env(lower, var_name)
                } else {
                    self.errors.push(EnvError::InvalidValue {
                        var: var_name.clone(),
                        expected: format!("one of {}", allowed.join("/")),
                        value,
                    });
                    Sourced::default_value(default.to_string())
                }
            }
            Err(_) => Sourced::default_value(default.to_string()),
        }
    }

    /// Get a boolean value with default.
    ///
    /// Accepts: 1, true, yes, on (for true)
    ///          0, false, no, off, "" (for false)
    pub fn get_bool(&mut self, name: &str, default: bool) -> Sourced<bool> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Sourced::from_env(true, var_name),
                "0" | "false" | "no" | "off" | "" => Sourced::from_env(false, var_name),
                _ => {
                    self.errors.push(EnvError::InvalidValue {
                        var: var_name,
                        expected: "boolean (true/false/1/0/yes/no)".to_string(),
                        value,
                    });
                    Sourced::default_value(default)
                }
            },
            Err(_) => Sourced::default_value(default),
        }
    }

    /// Get a path value with ~ expansion.
    ///
    /// If `must_exist` is true, records an error if the path doesn't exist.
    pub fn get_path(&mut self, name: &str, default: &str, must_exist: bool) -> Sourced<PathBuf> {
        let var_name = self.var_name(name);
        let from_env = env::var(&var_name).ok().filter(|v| !v.is_empty());
        let expanded = expand_home(from_env.as_deref().unwrap_or(default));

        if must_exist && !expanded.exists() {
            self.errors.push(EnvError::PathNotFound {
                var: var_name.clone(),
                path: expanded.clone(),
            });
        }

        if from_env.is_some() {
            Sourced::from_env(expanded, var_name)
        } else {
            Sourced::default_value(expanded)
        }
    }

    /// Get an optional path (None if not set or empty).
    pub fn get_optional_path(&mut self, name: &str) -> Sourced<Option<PathBuf>> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) if value.is_empty() => Sourced::from_env(None, var_name),
            Ok(value) => Sourced::from_env(Some(expand_home(&value)), var_name),
            Err(_) => Sourced::default_value(None),
        }
    }

    /// Get a log level value with validation.
    ///
    /// Full `EnvFilter` directives (containing `=` or `,`) are passed through.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) if value.contains('=') || value.contains(',') => {
                Sourced::from_env(value, var_name)
            }
            Ok(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, var_name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: var_name.clone(),
                            value,
                        });
                        Sourced::default_value(default.to_string())
                    }
                }
            }
            Err(_) => Sourced::default_value(default.to_string()),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/").zip(dirs::home_dir()) {
        Some((rest, home)) => home.join(rest),
        None => PathBuf::from(value),
    }
}
