//! Case corpus tooling.
//!
//! A corpus is a directory of past legal reviews, one folder per case:
//!
//! ```text
//! data/cases/
//!   index.jsonl
//!   2026-01-07_sns-campaign-botox/
//!     case.yaml
//!     request.md
//!     response.md
//!     extracted_rules.yaml
//! ```
//!
//! The triage engine never reads a corpus. These tools feed the rubric
//! maintenance loop instead: indexing, anonymization checks, rule-candidate
//! extraction and regression fixtures.

pub mod anonymize;
pub mod extract;
pub mod ingest;
pub mod regression;

use crate::errors::{Catalogued, ErrorCode};
use crate::types::Route;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use anonymize::{AnonymizationIssue, CaseCheck, FileCheck, PiiKind, check_case, check_text};
pub use extract::{
    Confidence, ExtractedRule, ExtractedRulesFile, ExtractionSummary, RuleKind,
    extract_rules_from_case,
};
pub use ingest::{CaseIndexEntry, is_case_directory, parse_case};
pub use regression::{
    RegressionFixture, RegressionOutcome, RegressionReport, RegressionSuite, run_regression,
};

/// Case metadata file inside each case folder.
pub const CASE_FILE: &str = "case.yaml";
/// Index file at the corpus root.
pub const INDEX_FILE: &str = "index.jsonl";
/// Extraction output inside each case folder.
pub const EXTRACTED_RULES_FILE: &str = "extracted_rules.yaml";

/// Contents of `case.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMetadata {
    pub case_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Outcome of the legal review, if one was reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Route>,
    #[serde(default)]
    pub rule_codes: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub prohibited_expressions: Vec<String>,
    #[serde(default)]
    pub required_modifications: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("cases directory not found: {}", path.display())]
    DirNotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid case file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid index line {line} in {}: {source}", path.display())]
    Index {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid extracted rules {}: {source}", path.display())]
    Rules {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{failed} case(s) contain personal information that is not anonymized")]
    AnonymizationFailed { failed: usize },

    #[error("{failed} of {total} regression case(s) failed")]
    RegressionFailed { failed: usize, total: usize },

    #[error("invalid regression fixtures {}: {source}", path.display())]
    Fixtures {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(String),
}

impl CaseError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Catalogued for CaseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::DirNotFound { .. } => ErrorCode::CaseDirNotFound,
            Self::Io { .. } | Self::Parse { .. } => ErrorCode::CaseParseError,
            Self::Index { .. } => ErrorCode::CaseIndexError,
            Self::Rules { .. } => ErrorCode::CaseRulesError,
            Self::AnonymizationFailed { .. } => ErrorCode::CaseAnonymizationFailed,
            Self::Fixtures { .. } | Self::RegressionFailed { .. } => {
                ErrorCode::CaseRegressionError
            }
            Self::Serialize(_) => ErrorCode::InternalSerdeError,
        }
    }
}

/// A case corpus rooted at a directory.
#[derive(Debug, Clone)]
pub struct CaseCorpus {
    root: PathBuf,
}

impl CaseCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Absolute folder for an index entry.
    pub fn case_dir(&self, entry: &CaseIndexEntry) -> PathBuf {
        self.root.join(&entry.path)
    }

    pub(crate) fn ensure_exists(&self) -> Result<(), CaseError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(CaseError::DirNotFound {
                path: self.root.clone(),
            })
        }
    }
}
