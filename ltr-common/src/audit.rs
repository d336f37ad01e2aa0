//! Append-only audit log of triage decisions.
//!
//! Each decision becomes one JSON line. Entries carry only the timestamp,
//! the input fingerprint, the route and counts; the description never reaches
//! the log. Write failures are logged at `debug` and never affect the
//! classification result.

use crate::errors::{Catalogued, ErrorCode};
use crate::types::{Route, TriageOutput};
use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Number of flag codes reported by [`AuditSummary::top_flags`].
pub const TOP_FLAG_LIMIT: usize = 5;

/// One persisted decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditEntry {
    pub timestamp: String,
    pub input_hash: String,
    pub routing: Route,
    pub confidence: f64,
    pub red_flag_codes: Vec<String>,
    pub missing_info_count: usize,
    pub guardrail_count: usize,
    /// Absent in entries written before versions were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric_version: Option<String>,
}

impl AuditEntry {
    pub fn from_output(output: &TriageOutput, rubric_version: Option<&str>) -> Self {
        Self {
            timestamp: output.timestamp.clone(),
            input_hash: output.input_hash.clone(),
            routing: output.routing,
            confidence: output.confidence,
            red_flag_codes: output.flag_codes().map(str::to_string).collect(),
            missing_info_count: output.missing_info_questions.len(),
            guardrail_count: output.safe_guardrails.len(),
            rubric_version: rubric_version.map(str::to_string),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to write audit log {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read audit log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Catalogued for AuditError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Write { .. } => ErrorCode::AuditWriteFailed,
            Self::Read { .. } => ErrorCode::AuditReadFailed,
            Self::Serialize(_) => ErrorCode::InternalSerdeError,
        }
    }
}

/// Audit logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    pub enabled: bool,
    pub log_file: PathBuf,
}

impl AuditOptions {
    /// Enabled logging to today's file in `log_dir`.
    pub fn in_dir(log_dir: &Path) -> Self {
        Self {
            enabled: true,
            log_file: default_log_file(log_dir, Utc::now().date_naive()),
        }
    }
}

/// `<log_dir>/audit-YYYY-MM-DD.jsonl`
pub fn default_log_file(log_dir: &Path, date: NaiveDate) -> PathBuf {
    log_dir.join(format!("audit-{}.jsonl", date.format("%Y-%m-%d")))
}

/// JSONL audit logger.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    options: AuditOptions,
    rubric_version: Option<String>,
}

impl AuditLogger {
    pub fn new(options: AuditOptions) -> Self {
        Self {
            options,
            rubric_version: None,
        }
    }

    /// Records this rubric version on every entry.
    #[must_use]
    pub fn with_rubric_version(mut self, version: impl Into<String>) -> Self {
        self.rubric_version = Some(version.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn log_file(&self) -> &Path {
        &self.options.log_file
    }

    /// Appends the decision. Failures are logged and swallowed.
    pub fn log(&self, output: &TriageOutput) {
        if let Err(e) = self.try_log(output) {
            debug!(error = %e, "Audit log write failed");
        }
    }

    /// Appends the decision, reporting failures. A disabled logger writes nothing.
    pub fn try_log(&self, output: &TriageOutput) -> Result<(), AuditError> {
        if !self.options.enabled {
            return Ok(());
        }

        let entry = AuditEntry::from_output(output, self.rubric_version.as_deref());
        let line = serde_json::to_string(&entry)?;
        let path = &self.options.log_file;
        let write_err = |source| AuditError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(write_err)?;
        writeln!(file, "{line}").map_err(write_err)?;

        debug!(path = %path.display(), input_hash = %entry.input_hash, "Appended audit entry");
        Ok(())
    }

    pub fn read_logs(&self) -> Result<Vec<AuditEntry>, AuditError> {
        read_audit_log(&self.options.log_file)
    }

    pub fn summary(&self) -> Result<AuditSummary, AuditError> {
        Ok(AuditSummary::from_entries(&self.read_logs()?))
    }
}

/// Reads every parseable entry. A missing file yields no entries.
pub fn read_audit_log(path: &Path) -> Result<Vec<AuditEntry>, AuditError> {
    let read_err = |source| AuditError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_err(e)),
    };

    let mut entries = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(read_err)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line = number + 1, "Skipping invalid audit line: {}", e),
        }
    }

    debug!("Loaded {} audit entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Per-code flag count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCount {
    pub code: String,
    pub count: usize,
}

/// Aggregate statistics over audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub escalate: usize,
    pub proceed: usize,
    /// Most frequent flag codes, ties in first-seen order.
    pub top_flags: Vec<FlagCount>,
}

impl AuditSummary {
    pub fn from_entries(entries: &[AuditEntry]) -> Self {
        let mut counts: Vec<FlagCount> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for code in entries.iter().flat_map(|e| &e.red_flag_codes) {
            match positions.get(code.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    positions.insert(code.as_str(), counts.len());
                    counts.push(FlagCount {
                        code: code.clone(),
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(TOP_FLAG_LIMIT);

        let escalate = entries
            .iter()
            .filter(|e| e.routing == Route::Escalate)
            .count();

        Self {
            total: entries.len(),
            escalate,
            proceed: entries.len() - escalate,
            top_flags: counts,
        }
    }
}
