//! Error catalog for Legal Triage Router.
//!
//! Every failure the library can report maps to a stable code in the
//! `LTR-Exxx` format, with a message and remediation steps. The binary prints
//! these so that operators can search for a code instead of an error string.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|--------------------------------------|
//! | E001-E099  | Config      | Rubric, config file and environment  |
//! | E100-E199  | Audit       | Audit log persistence                |
//! | E200-E299  | Cases       | Case corpus tooling                  |
//! | E300-E399  | Proposal    | Rubric update proposals              |
//! | E500-E599  | Internal    | Internal/unexpected errors           |
//!
//! # Example
//!
//! ```rust
//! use ltr_common::errors::catalog::ErrorCode;
//!
//! let entry = ErrorCode::RubricMissingSection.entry();
//! println!("{}", entry.format_full());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all LTR error scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// Rubric file does not exist
    RubricNotFound,
    /// Rubric file could not be read
    RubricReadError,
    /// Rubric file is not valid YAML or a section has the wrong shape
    RubricParseError,
    /// A required top-level rubric section is absent
    RubricMissingSection,
    /// A rubric entry has a missing, empty or unrecognized field
    RubricInvalidField,
    /// Two red flags share a code
    RubricDuplicateCode,
    /// Confidence threshold outside [0, 1]
    RubricInvalidThreshold,
    /// Config file named explicitly does not exist
    ConfigNotFound,
    /// Config file could not be read
    ConfigReadError,
    /// Config file contains invalid TOML
    ConfigParseError,
    /// Environment variable has an invalid value
    ConfigEnvError,

    // =========================================================================
    // Audit Errors (E100-E199)
    // =========================================================================
    /// Audit entry could not be written
    AuditWriteFailed,
    /// Audit log could not be read
    AuditReadFailed,

    // =========================================================================
    // Case Errors (E200-E299)
    // =========================================================================
    /// Case directory does not exist
    CaseDirNotFound,
    /// case.yaml is missing or malformed
    CaseParseError,
    /// Case index could not be read or written
    CaseIndexError,
    /// Case files contain personal data that is not anonymized
    CaseAnonymizationFailed,
    /// Extracted rules file could not be read or written
    CaseRulesError,
    /// Regression fixtures could not be read or written
    CaseRegressionError,

    // =========================================================================
    // Proposal Errors (E300-E399)
    // =========================================================================
    /// No proposal file exists
    ProposalNotFound,
    /// Proposal file is malformed
    ProposalParseError,
    /// Rubric version cannot be bumped
    ProposalInvalidVersion,
    /// Applying the proposal produced an invalid rubric
    ProposalInvalidResult,
    /// Proposal or updated rubric could not be written
    ProposalWriteFailed,

    // =========================================================================
    // Internal Errors (E500-E599)
    // =========================================================================
    /// Serialization failure
    InternalSerdeError,
    /// Logging could not be initialized
    InternalLoggingError,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            // Config (001-099)
            Self::RubricNotFound => 1,
            Self::RubricReadError => 2,
            Self::RubricParseError => 3,
            Self::RubricMissingSection => 4,
            Self::RubricInvalidField => 5,
            Self::RubricDuplicateCode => 6,
            Self::RubricInvalidThreshold => 7,
            Self::ConfigNotFound => 10,
            Self::ConfigReadError => 11,
            Self::ConfigParseError => 12,
            Self::ConfigEnvError => 13,

            // Audit (100-199)
            Self::AuditWriteFailed => 100,
            Self::AuditReadFailed => 101,

            // Cases (200-299)
            Self::CaseDirNotFound => 200,
            Self::CaseParseError => 201,
            Self::CaseIndexError => 202,
            Self::CaseAnonymizationFailed => 203,
            Self::CaseRulesError => 204,
            Self::CaseRegressionError => 205,

            // Proposal (300-399)
            Self::ProposalNotFound => 300,
            Self::ProposalParseError => 301,
            Self::ProposalInvalidVersion => 302,
            Self::ProposalInvalidResult => 303,
            Self::ProposalWriteFailed => 304,

            // Internal (500-599)
            Self::InternalSerdeError => 500,
            Self::InternalLoggingError => 501,
        }
    }

    /// Returns the formatted error code string (e.g., "LTR-E001").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("LTR-E{:03}", self.code_number())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Config,
            100..=199 => ErrorCategory::Audit,
            200..=299 => ErrorCategory::Cases,
            300..=399 => ErrorCategory::Proposal,
            _ => ErrorCategory::Internal,
        }
    }

    /// Returns the full error entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::RubricNotFound => "Rubric file not found",
            Self::RubricReadError => "Failed to read rubric file",
            Self::RubricParseError => "Rubric file is not valid YAML or has a mistyped section",
            Self::RubricMissingSection => "Rubric is missing a required top-level section",
            Self::RubricInvalidField => "Rubric entry has a missing or invalid field",
            Self::RubricDuplicateCode => "Rubric declares the same red-flag code twice",
            Self::RubricInvalidThreshold => "Rubric confidence threshold is not within [0, 1]",
            Self::ConfigNotFound => "Configuration file not found",
            Self::ConfigReadError => "Failed to read configuration file",
            Self::ConfigParseError => "Configuration file contains invalid TOML syntax",
            Self::ConfigEnvError => "Environment variable has invalid value",

            Self::AuditWriteFailed => "Failed to append audit log entry",
            Self::AuditReadFailed => "Failed to read audit log",

            Self::CaseDirNotFound => "Case directory not found",
            Self::CaseParseError => "Case metadata (case.yaml) is missing or malformed",
            Self::CaseIndexError => "Case index could not be read or written",
            Self::CaseAnonymizationFailed => "Case files contain non-anonymized personal data",
            Self::CaseRulesError => "Extracted rule candidates could not be read or written",
            Self::CaseRegressionError => "Regression fixtures could not be read or written",

            Self::ProposalNotFound => "Rubric update proposal not found",
            Self::ProposalParseError => "Rubric update proposal is malformed",
            Self::ProposalInvalidVersion => "Rubric version is not in MAJOR.MINOR form",
            Self::ProposalInvalidResult => "Applying the proposal produced an invalid rubric",
            Self::ProposalWriteFailed => "Failed to write proposal or updated rubric",

            Self::InternalSerdeError => "Serialization or deserialization failed",
            Self::InternalLoggingError => "Failed to initialize logging",
        }
    }

    /// Returns remediation steps for this error.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::RubricNotFound => &[
                "Check the path passed with --rubric or LTR_RUBRIC",
                "Set rubric_path in ltr.toml",
                "Run from the directory containing rubric.yaml",
            ],
            Self::RubricReadError => &["Check file permissions on the rubric file"],
            Self::RubricParseError => &[
                "Validate the YAML syntax of the rubric",
                "Ensure red_flags, question_templates and safe_guardrails are lists",
                "Ensure routing_policy is a mapping",
            ],
            Self::RubricMissingSection => &[
                "Add the missing section to the rubric",
                "Required sections: version, red_flags, question_templates, safe_guardrails, routing_policy",
            ],
            Self::RubricInvalidField => &[
                "Every red flag needs code, keywords, reason and severity",
                "Severity must be one of critical, high, medium, low",
                "Routes must be ESCALATE or PROCEED",
            ],
            Self::RubricDuplicateCode => &["Rename or merge the red flags sharing the code"],
            Self::RubricInvalidThreshold => {
                &["Set routing_policy.confidence_threshold to a value between 0 and 1"]
            }
            Self::ConfigNotFound => &[
                "Check the path passed with --config",
                "Omit --config to use ./ltr.toml or the user config directory",
            ],
            Self::ConfigReadError => &["Check file permissions on the config file"],
            Self::ConfigParseError => &[
                "Validate the TOML syntax",
                "Run 'ltr config show' to inspect effective values",
            ],
            Self::ConfigEnvError => &[
                "Check LTR_* environment variables for typos",
                "Boolean variables accept true/false/1/0/yes/no",
            ],

            Self::AuditWriteFailed => &[
                "Check that the audit log directory is writable",
                "Disable auditing with --no-log or LTR_AUDIT_ENABLED=false",
            ],
            Self::AuditReadFailed => &[
                "Check the path passed with --file",
                "Check file permissions on the audit log",
            ],

            Self::CaseDirNotFound => &[
                "Create the cases directory or set cases.dir in ltr.toml",
                "Case folders are named YYYY-MM-DD_<slug>",
            ],
            Self::CaseParseError => &[
                "Each case folder needs a case.yaml with case_id, title and date",
                "Validate the YAML syntax of case.yaml",
            ],
            Self::CaseIndexError => &["Run 'ltr cases ingest' to rebuild index.jsonl"],
            Self::CaseAnonymizationFailed => &[
                "Replace the reported values with placeholders such as 병원_A or [REDACTED]",
                "Re-run 'ltr cases anonymize' until every case passes",
            ],
            Self::CaseRulesError => &[
                "Validate the YAML syntax of extracted_rules.yaml",
                "Re-run 'ltr cases extract'",
            ],
            Self::CaseRegressionError => &["Run 'ltr cases gen-fixtures' to regenerate fixtures"],

            Self::ProposalNotFound => &["Run 'ltr rubric propose' first"],
            Self::ProposalParseError => &[
                "Validate the YAML syntax of the proposal",
                "Regenerate it with 'ltr rubric propose'",
            ],
            Self::ProposalInvalidVersion => &["Set the rubric version to a MAJOR.MINOR value such as 2.0"],
            Self::ProposalInvalidResult => &[
                "Review the proposal for empty keywords or duplicate codes",
                "Edit the proposal and re-run 'ltr rubric apply'",
            ],
            Self::ProposalWriteFailed => &["Check that the rubric and data directories are writable"],

            Self::InternalSerdeError => &["Report this issue with the command that triggered it"],
            Self::InternalLoggingError => &[
                "Check LTR_LOG_DIR points to a writable directory",
                "Check LTR_LOG_LEVEL is a valid filter directive",
            ],
        }
    }

    /// Returns all error codes.
    #[must_use]
    pub fn all() -> &'static [ErrorCode] {
        &[
            Self::RubricNotFound,
            Self::RubricReadError,
            Self::RubricParseError,
            Self::RubricMissingSection,
            Self::RubricInvalidField,
            Self::RubricDuplicateCode,
            Self::RubricInvalidThreshold,
            Self::ConfigNotFound,
            Self::ConfigReadError,
            Self::ConfigParseError,
            Self::ConfigEnvError,
            Self::AuditWriteFailed,
            Self::AuditReadFailed,
            Self::CaseDirNotFound,
            Self::CaseParseError,
            Self::CaseIndexError,
            Self::CaseAnonymizationFailed,
            Self::CaseRulesError,
            Self::CaseRegressionError,
            Self::ProposalNotFound,
            Self::ProposalParseError,
            Self::ProposalInvalidVersion,
            Self::ProposalInvalidResult,
            Self::ProposalWriteFailed,
            Self::InternalSerdeError,
            Self::InternalLoggingError,
        ]
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Rubric, config file and environment errors (E001-E099)
    Config,
    /// Audit log errors (E100-E199)
    Audit,
    /// Case corpus errors (E200-E299)
    Cases,
    /// Rubric update proposal errors (E300-E399)
    Proposal,
    /// Internal/unexpected errors (E500-E599)
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Audit => "Audit",
            Self::Cases => "Cases",
            Self::Proposal => "Proposal",
            Self::Internal => "Internal",
        }
    }

    /// Returns a short description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Config => "Rubric, configuration file and environment issues",
            Self::Audit => "Audit log persistence issues",
            Self::Cases => "Case corpus ingestion, anonymization and extraction issues",
            Self::Proposal => "Rubric update proposal issues",
            Self::Internal => "Internal errors that may indicate bugs",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete error entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "LTR-E001")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
}

impl ErrorEntry {
    /// Formats the error for display with full remediation steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let mut output = format!("[{}] {}\n", self.code, self.message);

        if !self.remediation.is_empty() {
            output.push_str("\nRemediation steps:\n");
            for (i, step) in self.remediation.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        output
    }

    /// Formats the error as a single line.
    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numbers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            let num = code.code_number();
            assert!(
                seen.insert(num),
                "Duplicate error code number: {} for {:?}",
                num,
                code
            );
        }
    }

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::RubricNotFound.code_string(), "LTR-E001");
        assert_eq!(ErrorCode::ConfigEnvError.code_string(), "LTR-E013");
        assert_eq!(ErrorCode::AuditWriteFailed.code_string(), "LTR-E100");
        assert_eq!(ErrorCode::CaseDirNotFound.code_string(), "LTR-E200");
        assert_eq!(ErrorCode::ProposalNotFound.code_string(), "LTR-E300");
        assert_eq!(ErrorCode::InternalSerdeError.code_string(), "LTR-E500");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ErrorCode::RubricParseError.category(), ErrorCategory::Config);
        assert_eq!(ErrorCode::AuditReadFailed.category(), ErrorCategory::Audit);
        assert_eq!(ErrorCode::CaseParseError.category(), ErrorCategory::Cases);
        assert_eq!(
            ErrorCode::ProposalInvalidVersion.category(),
            ErrorCategory::Proposal
        );
        assert_eq!(
            ErrorCode::InternalLoggingError.category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_every_code_has_remediation() {
        for code in ErrorCode::all() {
            assert!(
                !code.remediation().is_empty(),
                "{:?} has no remediation steps",
                code
            );
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_format_full_lists_numbered_steps() {
        let entry = ErrorCode::RubricMissingSection.entry();
        let text = entry.format_full();
        assert!(text.starts_with("[LTR-E004] Rubric is missing"));
        assert!(text.contains("Remediation steps:"));
        assert!(text.contains("  1. Add the missing section"));
    }

    #[test]
    fn test_format_brief() {
        let entry = ErrorCode::CaseIndexError.entry();
        assert_eq!(
            entry.format_brief(),
            "[LTR-E202] Case index could not be read or written"
        );
        assert_eq!(entry.to_string(), entry.format_brief());
    }
}
