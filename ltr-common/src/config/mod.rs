//! Configuration system for LTR.
//!
//! Layers, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, `./ltr.toml`, or the user config directory)
//! 3. `LTR_*` environment variables
//! 4. Command-line flags (applied by the binary)
//!
//! Every effective value is a [`Sourced`] that remembers which layer set it.

pub mod env;
pub mod file;
pub mod source;

pub use env::{EnvError, EnvParser};
pub use file::FileConfig;
pub use source::{ConfigSource, Sourced};

use crate::audit::{AuditOptions, default_log_file};
use crate::errors::{Catalogued, ErrorCode};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_RUBRIC_PATH: &str = "rubric.yaml";
pub const DEFAULT_AUDIT_LOG_DIR: &str = ".legal-triage-logs";
pub const DEFAULT_CASES_DIR: &str = "data/cases";
pub const DEFAULT_PROPOSAL_PATH: &str = "data/rubric-update-proposal.yaml";
pub const DEFAULT_REGRESSION_PATH: &str = "data/case-regression.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid environment: {}", format_env_errors(.0))]
    Env(Vec<EnvError>),
}

fn format_env_errors(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Catalogued for ConfigError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::ConfigNotFound,
            Self::Read { .. } => ErrorCode::ConfigReadError,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Env(_) => ErrorCode::ConfigEnvError,
        }
    }
}

/// Effective configuration with per-value sources.
#[derive(Debug, Clone, PartialEq)]
pub struct LtrConfig {
    pub rubric_path: Sourced<PathBuf>,
    pub audit_enabled: Sourced<bool>,
    pub audit_log_dir: Sourced<PathBuf>,
    pub audit_log_file: Sourced<Option<PathBuf>>,
    pub cases_dir: Sourced<PathBuf>,
    pub proposal_path: Sourced<PathBuf>,
    pub regression_path: Sourced<PathBuf>,
    pub output_color: Sourced<bool>,
    pub log_level: Sourced<String>,
    /// The config file that was read, if any.
    pub config_file: Option<PathBuf>,
}

impl Default for LtrConfig {
    fn default() -> Self {
        Self {
            rubric_path: Sourced::default_value(PathBuf::from(DEFAULT_RUBRIC_PATH)),
            audit_enabled: Sourced::default_value(true),
            audit_log_dir: Sourced::default_value(PathBuf::from(DEFAULT_AUDIT_LOG_DIR)),
            audit_log_file: Sourced::default_value(None),
            cases_dir: Sourced::default_value(PathBuf::from(DEFAULT_CASES_DIR)),
            proposal_path: Sourced::default_value(PathBuf::from(DEFAULT_PROPOSAL_PATH)),
            regression_path: Sourced::default_value(PathBuf::from(DEFAULT_REGRESSION_PATH)),
            output_color: Sourced::default_value(true),
            log_level: Sourced::default_value(DEFAULT_LOG_LEVEL.to_string()),
            config_file: None,
        }
    }
}

macro_rules! layer_file {
    ($target:expr, $value:expr, $path:expr) => {
        if let Some(value) = $value {
            $target = Sourced::from_file(value, $path);
        }
    };
}

macro_rules! layer_env {
    ($target:expr, $sourced:expr) => {{
        let sourced = $sourced;
        if sourced.is_from_env() {
            $target = sourced;
        }
    }};
}

impl LtrConfig {
    /// Defaults, then the discovered config file, then `LTR_*` variables.
    pub fn load(explicit_config: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = file::discover(explicit_config)? {
            let file = FileConfig::load(&path)?;
            config.apply_file(file, &path);
            debug!(path = %path.display(), "Loaded config file");
        }

        let mut parser = EnvParser::new();
        config.apply_env(&mut parser);
        if parser.has_errors() {
            return Err(ConfigError::Env(parser.take_errors()));
        }

        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig, path: &Path) {
        layer_file!(self.rubric_path, file.rubric_path, path);
        layer_file!(self.audit_enabled, file.audit.enabled, path);
        layer_file!(self.audit_log_dir, file.audit.log_dir, path);
        layer_file!(self.audit_log_file, file.audit.log_file.map(Some), path);
        layer_file!(self.cases_dir, file.cases.dir, path);
        layer_file!(self.proposal_path, file.cases.proposal_path, path);
        layer_file!(self.regression_path, file.cases.regression_path, path);
        layer_file!(self.output_color, file.output.color, path);
        layer_file!(self.log_level, file.log.level, path);
        self.config_file = Some(path.to_path_buf());
    }

    pub fn apply_env(&mut self, parser: &mut EnvParser) {
        layer_env!(
            self.rubric_path,
            parser.get_path("RUBRIC", DEFAULT_RUBRIC_PATH, false)
        );
        layer_env!(self.audit_enabled, parser.get_bool("AUDIT_ENABLED", true));
        layer_env!(
            self.audit_log_dir,
            parser.get_path("AUDIT_LOG_DIR", DEFAULT_AUDIT_LOG_DIR, false)
        );
        layer_env!(self.audit_log_file, parser.get_optional_path("AUDIT_LOG_FILE"));
        layer_env!(
            self.cases_dir,
            parser.get_path("CASES_DIR", DEFAULT_CASES_DIR, false)
        );
        layer_env!(
            self.proposal_path,
            parser.get_path("PROPOSAL_PATH", DEFAULT_PROPOSAL_PATH, false)
        );
        layer_env!(
            self.regression_path,
            parser.get_path("REGRESSION_PATH", DEFAULT_REGRESSION_PATH, false)
        );
        layer_env!(self.output_color, parser.get_bool("COLOR", true));
        layer_env!(
            self.log_level,
            parser.get_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL)
        );
    }

    /// The audit file: `audit.log_file` if set, else today's file in `audit.log_dir`.
    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_log_file
            .value
            .clone()
            .unwrap_or_else(|| default_log_file(&self.audit_log_dir.value, Utc::now().date_naive()))
    }

    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            enabled: self.audit_enabled.value,
            log_file: self.audit_log_path(),
        }
    }

    /// `(key, value, source)` rows for display.
    pub fn entries(&self) -> Vec<(&'static str, String, &ConfigSource)> {
        let path = |p: &Path| p.display().to_string();
        vec![
            ("rubric_path", path(&self.rubric_path.value), &self.rubric_path.source),
            (
                "audit.enabled",
                self.audit_enabled.value.to_string(),
                &self.audit_enabled.source,
            ),
            (
                "audit.log_dir",
                path(&self.audit_log_dir.value),
                &self.audit_log_dir.source,
            ),
            (
                "audit.log_file",
                self.audit_log_file
                    .value
                    .as_deref()
                    .map(path)
                    .unwrap_or_else(|| "(daily file in log_dir)".to_string()),
                &self.audit_log_file.source,
            ),
            ("cases.dir", path(&self.cases_dir.value), &self.cases_dir.source),
            (
                "cases.proposal_path",
                path(&self.proposal_path.value),
                &self.proposal_path.source,
            ),
            (
                "cases.regression_path",
                path(&self.regression_path.value),
                &self.regression_path.source,
            ),
            (
                "output.color",
                self.output_color.value.to_string(),
                &self.output_color.source,
            ),
            ("log.level", self.log_level.value.clone(), &self.log_level.source),
        ]
    }
}
