//! Error catalog and definitions for Legal Triage Router
//!
//! Each library error type maps onto a catalog code through [`Catalogued`],
//! so callers can print a stable `LTR-Exxx` code and remediation steps.
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

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};

/// An error that carries a stable catalog code.
pub trait Catalogued: std::error::Error {
    /// The catalog code for this error.
    fn error_code(&self) -> ErrorCode;

    /// Catalog entry for this error.
    fn catalog_entry(&self) -> ErrorEntry {
        self.error_code().entry()
    }
}

/// Finds the first catalogued error in an `anyhow` chain.
pub fn find_catalogued(err: &anyhow::Error) -> Option<ErrorCode> {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<crate::rubric::RubricError>() {
            return Some(e.error_code());
        }
        if let Some(e) = cause.downcast_ref::<crate::config::ConfigError>() {
            return Some(e.error_code());
        }
        if let Some(e) = cause.downcast_ref::<crate::audit::AuditError>() {
            return Some(e.error_code());
        }
        if let Some(e) = cause.downcast_ref::<crate::cases::CaseError>() {
            return Some(e.error_code());
        }
        if let Some(e) = cause.downcast_ref::<crate::rubric::update::ProposalError>() {
            return Some(e.error_code());
        }
        if let Some(e) = cause.downcast_ref::<crate::logging::LoggingError>() {
            return Some(e.error_code());
        }
    }
    None
}
