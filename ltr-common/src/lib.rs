//! Shared library for Legal Triage Router.
//!
//! The decision engine lives in [`triage`] and reads nothing but a validated
//! [`rubric::Rubric`] and a [`types::TriageInput`]. Everything else here is
//! plumbing around it: configuration, logging, the audit log, case-corpus
//! tooling and rubric update proposals.

pub mod audit;
pub mod cases;
pub mod config;
pub mod errors;
pub mod logging;
pub mod rubric;
pub mod schema;
pub mod testing;
pub mod triage;
pub mod types;

pub use audit::{AuditEntry, AuditLogger, AuditOptions, AuditSummary};
pub use config::{ConfigSource, LtrConfig, Sourced};
pub use errors::{Catalogued, ErrorCode};
pub use rubric::{Rubric, RubricError, load_rubric, parse_rubric};
pub use triage::{TriageEngine, fingerprint};
pub use types::{
    CrossBorder, DataUsage, DetectedRedFlag, Exposure, ExternalCommunication, NextStep,
    RevenueModel, Route, RoutingRule, Severity, TriageInput, TriageOutput,
};
