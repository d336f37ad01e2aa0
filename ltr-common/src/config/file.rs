//! TOML configuration file.
//!
//! ```toml
//! rubric_path = "rubric.yaml"
//!
//! [audit]
//! enabled = true
//! log_dir = ".legal-triage-logs"
//!
//! [cases]
//! dir = "data/cases"
//!
//! [output]
//! color = true
//!
//! [log]
//! level = "info"
//! ```

use super::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ltr.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub rubric_path: Option<PathBuf>,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub cases: CasesSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSection {
    pub enabled: Option<bool>,
    pub log_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasesSection {
    pub dir: Option<PathBuf>,
    pub proposal_path: Option<PathBuf>,
    pub regression_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    pub color: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    pub level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Platform config file, e.g. `~/.config/ltr/config.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ltr").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Picks the config file to read.
///
/// An explicit path must exist. Otherwise `./ltr.toml` is preferred over the
/// user config file; neither existing is not an error.
pub fn discover(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(user_config_path().filter(|p| p.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config = FileConfig::parse(
            r#"
rubric_path = "rules/rubric.yaml"

[audit]
enabled = false
log_dir = "logs"

[cases]
dir = "corpus"
regression_path = "fixtures.json"

[output]
color = false

[log]
level = "debug"
"#,
            Path::new("ltr.toml"),
        )
        .unwrap();
        assert_eq!(config.rubric_path, Some(PathBuf::from("rules/rubric.yaml")));
        assert_eq!(config.audit.enabled, Some(false));
        assert_eq!(config.audit.log_file, None);
        assert_eq!(config.cases.dir, Some(PathBuf::from("corpus")));
        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_empty_file() {
        let config = FileConfig::parse("", Path::new("ltr.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = FileConfig::parse("rubric_path = [", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            discover(Some(&missing)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_explicit_existing_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(discover(Some(&path)).unwrap(), Some(path));
    }
}
