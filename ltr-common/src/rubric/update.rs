//! Rubric update proposals built from approved case candidates.
//!
//! A proposal is a reviewable diff, never an automatic change: it is saved as
//! YAML next to the case data and only [`apply_proposal`] with `dry_run =
//! false` rewrites the rubric file.

use super::{Guardrail, RedFlag, Rubric, RubricError, load_rubric, parse_rubric};
use crate::cases::{ExtractedRule, RuleKind};
use crate::errors::{Catalogued, ErrorCode};
use crate::types::Severity;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MODIFIED_REASON: &str = "케이스에서 추출된 키워드";
const DEFAULT_NEW_FLAG_REASON: &str = "케이스에서 추출된 새로운 위험 요소";

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("proposal not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read proposal {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid proposal {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("rubric version '{0}' is not in MAJOR.MINOR form")]
    InvalidVersion(String),

    #[error("proposal produces an invalid rubric: {0}")]
    InvalidResult(#[source] RubricError),

    #[error(transparent)]
    Rubric(#[from] RubricError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_yaml_ng::Error),
}

impl Catalogued for ProposalError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ProposalNotFound,
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ProposalParseError,
            Self::InvalidVersion(_) => ErrorCode::ProposalInvalidVersion,
            Self::InvalidResult(_) => ErrorCode::ProposalInvalidResult,
            Self::Rubric(e) => e.error_code(),
            Self::Write { .. } => ErrorCode::ProposalWriteFailed,
            Self::Serialize(_) => ErrorCode::InternalSerdeError,
        }
    }
}

/// Keywords to append to an existing red flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedRedFlag {
    pub code: String,
    pub added_keywords: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricUpdateProposal {
    pub generated_at: String,
    pub source_cases: Vec<String>,
    #[serde(default)]
    pub new_red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub new_guardrails: Vec<Guardrail>,
    #[serde(default)]
    pub modified_red_flags: Vec<ModifiedRedFlag>,
    #[serde(default)]
    pub diff_preview: String,
}

impl RubricUpdateProposal {
    pub fn is_empty(&self) -> bool {
        self.new_red_flags.is_empty()
            && self.new_guardrails.is_empty()
            && self.modified_red_flags.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), ProposalError> {
        let write_err = |source| ProposalError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, serde_yaml_ng::to_string(self)?).map_err(write_err)?;
        info!(path = %path.display(), "Saved rubric update proposal");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ProposalError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ProposalError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ProposalError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_yaml_ng::from_str(&content).map_err(|source| ProposalError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Builds a proposal from approved candidates.
///
/// Red-flag candidates need a code and keywords: keywords for an existing code
/// that no flag lists yet (case-insensitive) extend that flag, and unknown
/// codes become new flags, merged per code. Guardrail candidates need a
/// condition and text, and are only proposed for conditions the rubric lacks.
pub fn generate_proposal(rubric: &Rubric, approved: &[ExtractedRule]) -> RubricUpdateProposal {
    let mut source_cases: Vec<String> = Vec::new();
    let mut new_red_flags: Vec<RedFlag> = Vec::new();
    let mut new_guardrails: Vec<Guardrail> = Vec::new();
    let mut modified_red_flags: Vec<ModifiedRedFlag> = Vec::new();

    for rule in approved {
        if !source_cases.contains(&rule.source_case_id) {
            source_cases.push(rule.source_case_id.clone());
        }

        match rule.kind {
            RuleKind::RedFlag => {
                let (Some(code), Some(keywords)) = (&rule.proposed_code, &rule.proposed_keywords)
                else {
                    debug!(case_id = %rule.source_case_id, "Skipping red-flag candidate without code");
                    continue;
                };

                if rubric.red_flag(code).is_some() {
                    let fresh = keywords.iter().filter(|kw| !rubric.contains_keyword(kw));
                    let index = match modified_red_flags.iter().position(|m| &m.code == code) {
                        Some(index) => index,
                        None => {
                            modified_red_flags.push(ModifiedRedFlag {
                                code: code.clone(),
                                added_keywords: Vec::new(),
                                reason: rule
                                    .proposed_reason
                                    .clone()
                                    .unwrap_or_else(|| DEFAULT_MODIFIED_REASON.to_string()),
                            });
                            modified_red_flags.len() - 1
                        }
                    };
                    push_unique(&mut modified_red_flags[index].added_keywords, fresh);
                } else if let Some(flag) = new_red_flags.iter_mut().find(|f| &f.code == code) {
                    push_unique(&mut flag.keywords, keywords.iter());
                } else {
                    new_red_flags.push(RedFlag {
                        code: code.clone(),
                        keywords: Vec::new(),
                        reason: rule
                            .proposed_reason
                            .clone()
                            .unwrap_or_else(|| DEFAULT_NEW_FLAG_REASON.to_string()),
                        severity: rule.proposed_severity.unwrap_or(Severity::High),
                    });
                    if let Some(flag) = new_red_flags.last_mut() {
                        push_unique(&mut flag.keywords, keywords.iter());
                    }
                }
            }
            RuleKind::Guardrail => {
                let (Some(condition), Some(text)) = (&rule.proposed_condition, &rule.proposed_text)
                else {
                    continue;
                };
                if !rubric.has_guardrail_condition(condition)
                    && !new_guardrails.iter().any(|g| &g.condition == condition && &g.text == text)
                {
                    new_guardrails.push(Guardrail {
                        condition: condition.clone(),
                        text: text.clone(),
                    });
                }
            }
        }
    }

    // Modifications whose every keyword already exists add nothing.
    modified_red_flags.retain(|m| !m.added_keywords.is_empty());
    new_red_flags.retain(|f| !f.keywords.is_empty());

    let mut proposal = RubricUpdateProposal {
        generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        source_cases,
        new_red_flags,
        new_guardrails,
        modified_red_flags,
        diff_preview: String::new(),
    };
    proposal.diff_preview = diff_preview(rubric, &proposal);
    proposal
}

fn push_unique<'a>(target: &mut Vec<String>, keywords: impl Iterator<Item = &'a String>) {
    for keyword in keywords {
        if !keyword.trim().is_empty() && !target.contains(keyword) {
            target.push(keyword.clone());
        }
    }
}

/// Markdown preview with `diff` blocks for each change.
pub fn diff_preview(rubric: &Rubric, proposal: &RubricUpdateProposal) -> String {
    let mut lines = vec![
        "# Rubric Update Proposal".to_string(),
        format!("# Generated: {}", proposal.generated_at),
        String::new(),
    ];

    if !proposal.modified_red_flags.is_empty() {
        lines.push("## Modified Red Flags (키워드 추가)".to_string());
        lines.push(String::new());
        for modified in &proposal.modified_red_flags {
            let Some(flag) = rubric.red_flag(&modified.code) else {
                continue;
            };
            lines.push(format!("### {}", modified.code));
            lines.push("```diff".to_string());
            lines.push(format!("  - code: \"{}\"", modified.code));
            lines.push("    keywords:".to_string());
            lines.extend(flag.keywords.iter().map(|kw| format!("      - \"{kw}\"")));
            lines.extend(
                modified
                    .added_keywords
                    .iter()
                    .map(|kw| format!("+     - \"{kw}\"  # NEW")),
            );
            lines.push("```".to_string());
            lines.push(format!("> Reason: {}", modified.reason));
            lines.push(String::new());
        }
    }

    if !proposal.new_red_flags.is_empty() {
        lines.push("## New Red Flags".to_string());
        lines.push(String::new());
        for flag in &proposal.new_red_flags {
            lines.push("```diff".to_string());
            lines.push(format!("+ - code: \"{}\"", flag.code));
            lines.push("+   keywords:".to_string());
            lines.extend(flag.keywords.iter().map(|kw| format!("+     - \"{kw}\"")));
            lines.push(format!("+   reason: \"{}\"", flag.reason));
            lines.push(format!("+   severity: \"{}\"", flag.severity));
            lines.push("```".to_string());
            lines.push(String::new());
        }
    }

    if !proposal.new_guardrails.is_empty() {
        lines.push("## New Guardrails".to_string());
        lines.push(String::new());
        for guardrail in &proposal.new_guardrails {
            lines.push("```diff".to_string());
            lines.push(format!("+ - condition: \"{}\"", guardrail.condition));
            lines.push(format!("+   text: \"{}\"", guardrail.text));
            lines.push("```".to_string());
            lines.push(String::new());
        }
    }

    if proposal.is_empty() {
        lines.push("No approved rules found. Nothing to update.".to_string());
    }

    lines.join("\n")
}

/// `2.0` -> `2.1`. Components past the minor number are dropped.
pub fn bump_minor_version(version: &str) -> Result<String, ProposalError> {
    let invalid = || ProposalError::InvalidVersion(version.to_string());
    let mut parts = version.trim().split('.');
    let major: u64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let minor: u64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    Ok(format!("{major}.{}", minor + 1))
}

/// Applies a proposal to a rubric in memory and re-validates the result.
pub fn apply_to(rubric: &Rubric, proposal: &RubricUpdateProposal) -> Result<Rubric, ProposalError> {
    let mut updated = rubric.clone();

    for modified in &proposal.modified_red_flags {
        if let Some(flag) = updated.red_flags.iter_mut().find(|f| f.code == modified.code) {
            flag.keywords.extend(modified.added_keywords.iter().cloned());
        }
    }
    updated.red_flags.extend(proposal.new_red_flags.iter().cloned());
    updated
        .safe_guardrails
        .extend(proposal.new_guardrails.iter().cloned());
    updated.version = bump_minor_version(&rubric.version)?;

    let yaml = updated.to_yaml()?;
    parse_rubric(&yaml).map_err(ProposalError::InvalidResult)
}

/// Outcome of [`apply_proposal`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedProposal {
    pub previous_version: String,
    pub rubric: Rubric,
    /// False for a dry run.
    pub written: bool,
}

/// Applies a proposal to the rubric file. A dry run validates and returns the
/// result without touching the file.
pub fn apply_proposal(
    rubric_path: &Path,
    proposal: &RubricUpdateProposal,
    dry_run: bool,
) -> Result<AppliedProposal, ProposalError> {
    let current = load_rubric(rubric_path)?;
    let updated = apply_to(&current, proposal)?;

    if !dry_run {
        fs::write(rubric_path, updated.to_yaml()?).map_err(|source| ProposalError::Write {
            path: rubric_path.to_path_buf(),
            source,
        })?;
        info!(
            path = %rubric_path.display(),
            from = %current.version,
            to = %updated.version,
            "Rubric updated"
        );
    }

    Ok(AppliedProposal {
        previous_version: current.version,
        rubric: updated,
        written: !dry_run,
    })
}
