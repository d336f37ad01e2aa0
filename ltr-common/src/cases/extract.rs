//! Rule-candidate extraction from past reviews.
//!
//! Candidates come from two places: the structured `case.yaml` fields
//! (prohibited expressions and required modifications) and quoted phrases in
//! the legal team's `response.md`. Nothing is applied to the rubric here; a
//! reviewer marks candidates `approved` in `extracted_rules.yaml` and the
//! approved ones feed [`crate::rubric::update`].

use super::ingest::parse_case;
use super::{CaseCorpus, CaseError, CaseMetadata, EXTRACTED_RULES_FILE};
use crate::types::Severity;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

/// Code proposed when a case lists no rule codes.
pub const PLACEHOLDER_CODE: &str = "NEW_CODE";
/// Condition attached to guardrails derived from `required_modifications`.
pub const CASE_DERIVED_CONDITION: &str = "case_derived_modification";

const PROHIBITION_LEN: std::ops::RangeInclusive<usize> = 2..=30;
const RECOMMENDATION_LEN: std::ops::RangeInclusive<usize> = 5..=100;

static PROHIBITION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)['"“”‘’]([^'"“”‘’]+)['"“”‘’](?:은|는|이|가)?\s*(?:금지|불가|사용\s*(?:불가|금지)|사용할\s*수\s*없)"#,
        r#"(?i)['"“”‘’]([^'"“”‘’]+)['"“”‘’](?:을|를|은|는)?\s*(?:삭제|제거)"#,
        r"(?i)([가-힣a-zA-Z0-9%]+)\s*(?:표현|문구)?\s*(?:금지|불가)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("built-in prohibition pattern must compile"))
    .collect()
});

static RECOMMENDATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)['"“”‘’]([^'"“”‘’]+)['"“”‘’](?:을|를)?\s*(?:추가|포함|명시|표시)"#,
        r#"(?i)['"“”‘’]([^'"“”‘’]+)['"“”‘’](?:을|를)?\s*(?:해야|하세요|필수)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("built-in recommendation pattern must compile"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    RedFlag,
    Guardrail,
}

/// How much a candidate can be trusted before review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A proposed red flag or guardrail awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRule {
    pub source_case_id: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_text: Option<String>,
    pub evidence_quote: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl ExtractedRule {
    fn red_flag(case_id: &str, keyword: &str, evidence: String, confidence: Confidence) -> Self {
        Self {
            source_case_id: case_id.to_string(),
            kind: RuleKind::RedFlag,
            proposed_code: None,
            proposed_keywords: Some(vec![keyword.to_string()]),
            proposed_severity: Some(Severity::High),
            proposed_reason: None,
            proposed_condition: None,
            proposed_text: None,
            evidence_quote: evidence,
            confidence,
            reviewed: false,
            approved: None,
        }
    }

    fn guardrail(case_id: &str, text: &str, evidence: String, confidence: Confidence) -> Self {
        Self {
            source_case_id: case_id.to_string(),
            kind: RuleKind::Guardrail,
            proposed_code: None,
            proposed_keywords: None,
            proposed_severity: None,
            proposed_reason: None,
            proposed_condition: None,
            proposed_text: Some(text.to_string()),
            evidence_quote: evidence,
            confidence,
            reviewed: false,
            approved: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approved == Some(true)
    }

    /// Two candidates with the same identity are duplicates.
    fn identity(&self) -> (RuleKind, Option<&[String]>, Option<&str>) {
        (
            self.kind,
            self.proposed_keywords.as_deref(),
            self.proposed_text.as_deref(),
        )
    }
}

/// Contents of `extracted_rules.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRulesFile {
    pub case_id: String,
    pub extracted_at: String,
    #[serde(default)]
    pub rules: Vec<ExtractedRule>,
}

/// Per-case result of [`CaseCorpus::extract_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub case_id: String,
    pub rules: usize,
    pub saved_to: Option<PathBuf>,
}

fn captured_phrases(patterns: &[Regex], text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phrases = Vec::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                let phrase = m.as_str().trim().to_string();
                if seen.insert(phrase.clone()) {
                    phrases.push(phrase);
                }
            }
        }
    }
    phrases
}

/// Phrases the response text marks as prohibited or to be removed.
pub fn prohibited_phrases(text: &str) -> Vec<String> {
    captured_phrases(&PROHIBITION_PATTERNS, text)
}

/// Phrases the response text asks to add or state.
pub fn recommended_phrases(text: &str) -> Vec<String> {
    captured_phrases(&RECOMMENDATION_PATTERNS, text)
}

/// Candidates from the structured case fields.
pub fn candidates_from_metadata(case: &CaseMetadata) -> Vec<ExtractedRule> {
    let code = case
        .rule_codes
        .first()
        .map_or(PLACEHOLDER_CODE, String::as_str);

    let flags = case.prohibited_expressions.iter().map(|expr| ExtractedRule {
        proposed_code: Some(code.to_string()),
        proposed_reason: Some(format!("케이스 {}에서 금지된 표현", case.case_id)),
        ..ExtractedRule::red_flag(
            &case.case_id,
            expr,
            format!("prohibited_expressions: \"{expr}\""),
            Confidence::Medium,
        )
    });

    let guardrails = case.required_modifications.iter().map(|modification| ExtractedRule {
        proposed_condition: Some(CASE_DERIVED_CONDITION.to_string()),
        ..ExtractedRule::guardrail(
            &case.case_id,
            modification,
            format!("required_modifications: \"{modification}\""),
            Confidence::Medium,
        )
    });

    flags.chain(guardrails).collect()
}

/// Low-confidence candidates mined from the legal response text.
pub fn candidates_from_response(case_id: &str, response: &str) -> Vec<ExtractedRule> {
    let flags = prohibited_phrases(response)
        .into_iter()
        .filter(|expr| PROHIBITION_LEN.contains(&expr.chars().count()))
        .map(|expr| ExtractedRule {
            proposed_reason: Some("법무 회신에서 금지된 표현으로 언급".to_string()),
            ..ExtractedRule::red_flag(
                case_id,
                &expr,
                format!("금지 표현 감지: \"{expr}\""),
                Confidence::Low,
            )
        });

    let guardrails = recommended_phrases(response)
        .into_iter()
        .filter(|rec| RECOMMENDATION_LEN.contains(&rec.chars().count()))
        .map(|rec| {
            ExtractedRule::guardrail(
                case_id,
                &rec,
                format!("권고 사항 감지: \"{rec}\""),
                Confidence::Low,
            )
        });

    flags.chain(guardrails).collect()
}

fn deduplicate(rules: Vec<ExtractedRule>) -> Vec<ExtractedRule> {
    let mut unique: Vec<ExtractedRule> = Vec::with_capacity(rules.len());
    for rule in rules {
        if !unique.iter().any(|u| u.identity() == rule.identity()) {
            unique.push(rule);
        }
    }
    unique
}

/// Extracts candidates from `case.yaml` and, when present, `response.md`.
pub fn extract_rules_from_case(case_dir: &Path) -> Result<ExtractedRulesFile, CaseError> {
    let case = parse_case(case_dir)?;
    let mut rules = candidates_from_metadata(&case);

    let response_path = case_dir.join("response.md");
    if response_path.is_file() {
        let response =
            fs::read_to_string(&response_path).map_err(CaseError::io(&response_path))?;
        rules.extend(candidates_from_response(&case.case_id, &response));
    }

    Ok(ExtractedRulesFile {
        case_id: case.case_id,
        extracted_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        rules: deduplicate(rules),
    })
}

/// Reads `extracted_rules.yaml` if the folder has one.
pub fn load_extracted_rules(case_dir: &Path) -> Result<Option<ExtractedRulesFile>, CaseError> {
    let path = case_dir.join(EXTRACTED_RULES_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CaseError::io(&path)(e)),
    };
    serde_yaml_ng::from_str(&content)
        .map(Some)
        .map_err(|source| CaseError::Rules { path, source })
}

/// Writes `extracted_rules.yaml`, carrying over `reviewed`/`approved` from
/// matching candidates of a previous run.
pub fn save_extracted_rules(
    case_dir: &Path,
    extracted: &mut ExtractedRulesFile,
) -> Result<PathBuf, CaseError> {
    if let Some(existing) = load_extracted_rules(case_dir)? {
        for rule in &mut extracted.rules {
            if let Some(previous) = existing
                .rules
                .iter()
                .find(|r| r.identity() == rule.identity())
            {
                rule.reviewed = previous.reviewed;
                rule.approved = previous.approved;
            }
        }
    }

    let path = case_dir.join(EXTRACTED_RULES_FILE);
    let yaml =
        serde_yaml_ng::to_string(extracted).map_err(|e| CaseError::Serialize(e.to_string()))?;
    fs::write(&path, yaml).map_err(CaseError::io(&path))?;
    Ok(path)
}

impl CaseCorpus {
    /// Runs extraction for every indexed case. Cases yielding no candidates
    /// are left untouched.
    pub fn extract_all(&self) -> Result<Vec<ExtractionSummary>, CaseError> {
        let mut summaries = Vec::new();
        for entry in self.load_index()? {
            let case_dir = self.case_dir(&entry);
            let mut extracted = match extract_rules_from_case(&case_dir) {
                Ok(extracted) => extracted,
                Err(e) => {
                    warn!(case_id = %entry.case_id, error = %e, "Extraction failed");
                    continue;
                }
            };

            let saved_to = if extracted.rules.is_empty() {
                None
            } else {
                Some(save_extracted_rules(&case_dir, &mut extracted)?)
            };
            info!(case_id = %entry.case_id, rules = extracted.rules.len(), "Extracted rule candidates");
            summaries.push(ExtractionSummary {
                case_id: entry.case_id,
                rules: extracted.rules.len(),
                saved_to,
            });
        }
        Ok(summaries)
    }

    /// Approved candidates across all indexed cases, in index order.
    pub fn collect_approved_rules(&self) -> Result<Vec<ExtractedRule>, CaseError> {
        let mut approved = Vec::new();
        for entry in self.load_index()? {
            if let Some(file) = load_extracted_rules(&self.case_dir(&entry))? {
                approved.extend(file.rules.into_iter().filter(ExtractedRule::is_approved));
            }
        }
        Ok(approved)
    }
}
