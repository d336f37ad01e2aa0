//! Rubric model: red-flag definitions, question templates, guardrails and
//! routing-policy constants.
//!
//! A [`Rubric`] is only ever produced by validation (see [`load`]), so every
//! value of this type satisfies its invariants: red-flag codes are unique,
//! keyword sets are non-empty, and the confidence threshold is a probability.

pub mod load;
pub mod update;

use crate::errors::{Catalogued, ErrorCode};
use crate::types::{Route, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use load::{DEFAULT_CONFIDENCE_THRESHOLD, load_rubric, parse_rubric};

/// A keyword-triggered risk signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlag {
    pub code: String,
    pub keywords: Vec<String>,
    pub reason: String,
    pub severity: Severity,
}

/// A clarifying question asked when a field is unknown or a keyword appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionTemplate {
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    pub trigger_if_unknown: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trigger_if_contains: Vec<String>,
}

/// Guardrail text attached to a symbolic condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardrail {
    pub condition: String,
    pub text: String,
}

/// Routing-policy constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    pub default: Route,
    pub confidence_threshold: f64,
    pub missing_info_action: Route,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            default: Route::Escalate,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            missing_info_action: Route::Escalate,
        }
    }
}

/// Validated, read-only rubric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rubric {
    pub version: String,
    pub red_flags: Vec<RedFlag>,
    pub question_templates: Vec<QuestionTemplate>,
    pub safe_guardrails: Vec<Guardrail>,
    pub routing_policy: RoutingPolicy,
}

impl Rubric {
    /// Looks up a red flag by code.
    #[must_use]
    pub fn red_flag(&self, code: &str) -> Option<&RedFlag> {
        self.red_flags.iter().find(|f| f.code == code)
    }

    /// Whether any red flag already lists the keyword (case-insensitive).
    #[must_use]
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.red_flags
            .iter()
            .flat_map(|f| f.keywords.iter())
            .any(|k| k.to_lowercase() == needle)
    }

    /// Whether a guardrail with this condition exists.
    #[must_use]
    pub fn has_guardrail_condition(&self, condition: &str) -> bool {
        self.safe_guardrails.iter().any(|g| g.condition == condition)
    }

    /// Number of red flags per severity, in `Severity::ALL` order.
    #[must_use]
    pub fn severity_counts(&self) -> [(Severity, usize); 4] {
        Severity::ALL.map(|s| (s, self.red_flags.iter().filter(|f| f.severity == s).count()))
    }

    /// Short content digest used to tell rubric revisions apart in logs.
    #[must_use]
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let hash = blake3::hash(&bytes);
        hash.to_hex()[..16].to_string()
    }

    /// Serializes the rubric back to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }
}

/// Rubric loading and validation failures. All are fatal at construction.
#[derive(Debug, Error)]
pub enum RubricError {
    #[error("rubric file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read rubric {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rubric YAML: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("rubric is missing required section '{0}'")]
    MissingSection(&'static str),

    #[error("rubric version must be a quoted string")]
    VersionNotText,

    #[error("{section}[{index}]: missing or empty field '{field}'")]
    MissingField {
        section: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("red flag '{code}' has an empty keyword list")]
    EmptyKeywords { code: String },

    #[error("{section}[{index}]: keywords must not be empty strings")]
    EmptyKeyword { section: &'static str, index: usize },

    #[error("red flag '{code}' has unknown severity '{value}'")]
    UnknownSeverity { code: String, value: String },

    #[error("routing_policy.{field} has unknown route '{value}'")]
    UnknownRoute { field: &'static str, value: String },

    #[error("duplicate red flag code '{0}'")]
    DuplicateCode(String),

    #[error("routing_policy.confidence_threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

impl Catalogued for RubricError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::RubricNotFound,
            Self::Read { .. } => ErrorCode::RubricReadError,
            Self::Parse(_) => ErrorCode::RubricParseError,
            Self::MissingSection(_) => ErrorCode::RubricMissingSection,
            Self::MissingField { .. }
            | Self::VersionNotText
            | Self::EmptyKeywords { .. }
            | Self::EmptyKeyword { .. }
            | Self::UnknownSeverity { .. }
            | Self::UnknownRoute { .. } => ErrorCode::RubricInvalidField,
            Self::DuplicateCode(_) => ErrorCode::RubricDuplicateCode,
            Self::InvalidThreshold(_) => ErrorCode::RubricInvalidThreshold,
        }
    }
}
