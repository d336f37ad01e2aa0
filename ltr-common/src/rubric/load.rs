//! Rubric loading and validation.
//!
//! The YAML is first read into permissive raw structs so that a missing
//! section or field yields a precise [`RubricError`] instead of a generic
//! deserialization message. A mistyped section (for example `red_flags` given
//! as a string) is still rejected by the YAML layer.

use super::{Guardrail, QuestionTemplate, RedFlag, Rubric, RubricError, RoutingPolicy};
use crate::triage::guardrails::GuardrailCondition;
use crate::types::{Route, Severity};
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Threshold used when `routing_policy.confidence_threshold` is absent.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct RawRubric {
    version: Option<Value>,
    red_flags: Option<Vec<RawRedFlag>>,
    question_templates: Option<Vec<RawQuestionTemplate>>,
    safe_guardrails: Option<Vec<RawGuardrail>>,
    routing_policy: Option<RawRoutingPolicy>,
}

#[derive(Debug, Deserialize)]
struct RawRedFlag {
    code: Option<String>,
    keywords: Option<Vec<String>>,
    reason: Option<String>,
    severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawQuestionTemplate {
    category: Option<String>,
    question: Option<String>,
    options: Option<Vec<String>>,
    #[serde(default)]
    trigger_if_unknown: bool,
    #[serde(default)]
    trigger_if_contains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawGuardrail {
    condition: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRoutingPolicy {
    default: Option<String>,
    confidence_threshold: Option<f64>,
    missing_info_action: Option<String>,
}

/// Reads and validates a rubric file.
pub fn load_rubric(path: &Path) -> Result<Rubric, RubricError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RubricError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RubricError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let rubric = parse_rubric(&content)?;
    info!(
        path = %path.display(),
        version = %rubric.version,
        red_flags = rubric.red_flags.len(),
        question_templates = rubric.question_templates.len(),
        guardrails = rubric.safe_guardrails.len(),
        digest = %rubric.digest(),
        "Loaded rubric"
    );
    Ok(rubric)
}

/// Parses and validates rubric YAML.
pub fn parse_rubric(yaml: &str) -> Result<Rubric, RubricError> {
    let raw: RawRubric = serde_yaml_ng::from_str(yaml)?;
    validate(raw)
}

fn validate(raw: RawRubric) -> Result<Rubric, RubricError> {
    let version = match raw.version {
        None => return Err(RubricError::MissingSection("version")),
        Some(Value::String(v)) if !v.trim().is_empty() => v,
        Some(Value::String(_)) => return Err(RubricError::MissingSection("version")),
        Some(_) => return Err(RubricError::VersionNotText),
    };

    let red_flags = validate_red_flags(
        raw.red_flags
            .ok_or(RubricError::MissingSection("red_flags"))?,
    )?;
    let question_templates = validate_questions(
        raw.question_templates
            .ok_or(RubricError::MissingSection("question_templates"))?,
    )?;
    let safe_guardrails = validate_guardrails(
        raw.safe_guardrails
            .ok_or(RubricError::MissingSection("safe_guardrails"))?,
    )?;
    let routing_policy = validate_policy(
        raw.routing_policy
            .ok_or(RubricError::MissingSection("routing_policy"))?,
    )?;

    Ok(Rubric {
        version,
        red_flags,
        question_templates,
        safe_guardrails,
        routing_policy,
    })
}

fn required(
    value: Option<String>,
    section: &'static str,
    index: usize,
    field: &'static str,
) -> Result<String, RubricError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RubricError::MissingField {
            section,
            index,
            field,
        }),
    }
}

fn validate_red_flags(raw: Vec<RawRedFlag>) -> Result<Vec<RedFlag>, RubricError> {
    let mut seen = HashSet::new();
    let mut flags = Vec::with_capacity(raw.len());

    for (index, item) in raw.into_iter().enumerate() {
        let code = required(item.code, "red_flags", index, "code")?;
        let keywords = item.keywords.ok_or(RubricError::MissingField {
            section: "red_flags",
            index,
            field: "keywords",
        })?;
        if keywords.is_empty() {
            return Err(RubricError::EmptyKeywords { code });
        }
        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(RubricError::EmptyKeyword {
                section: "red_flags",
                index,
            });
        }
        let reason = required(item.reason, "red_flags", index, "reason")?;
        let severity_raw = required(item.severity, "red_flags", index, "severity")?;
        let severity: Severity =
            severity_raw
                .parse()
                .map_err(|_| RubricError::UnknownSeverity {
                    code: code.clone(),
                    value: severity_raw.clone(),
                })?;

        if !seen.insert(code.clone()) {
            return Err(RubricError::DuplicateCode(code));
        }

        flags.push(RedFlag {
            code,
            keywords,
            reason,
            severity,
        });
    }

    Ok(flags)
}

fn validate_questions(raw: Vec<RawQuestionTemplate>) -> Result<Vec<QuestionTemplate>, RubricError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            let category = required(item.category, "question_templates", index, "category")?;
            let question = required(item.question, "question_templates", index, "question")?;
            let options = item.options.ok_or(RubricError::MissingField {
                section: "question_templates",
                index,
                field: "options",
            })?;
            if item.trigger_if_contains.iter().any(|k| k.trim().is_empty()) {
                return Err(RubricError::EmptyKeyword {
                    section: "question_templates",
                    index,
                });
            }
            Ok(QuestionTemplate {
                category,
                question,
                options,
                trigger_if_unknown: item.trigger_if_unknown,
                trigger_if_contains: item.trigger_if_contains,
            })
        })
        .collect()
}

fn validate_guardrails(raw: Vec<RawGuardrail>) -> Result<Vec<Guardrail>, RubricError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            let condition = required(item.condition, "safe_guardrails", index, "condition")?;
            let text = required(item.text, "safe_guardrails", index, "text")?;
            if condition.parse::<GuardrailCondition>().is_err() {
                warn!(
                    condition = %condition,
                    "Guardrail condition is not recognized and will never apply"
                );
            }
            Ok(Guardrail { condition, text })
        })
        .collect()
}

fn validate_policy(raw: RawRoutingPolicy) -> Result<RoutingPolicy, RubricError> {
    let defaults = RoutingPolicy::default();

    let parse_route = |value: Option<String>, field: &'static str, fallback: Route| match value {
        None => Ok(fallback),
        Some(v) => v
            .parse::<Route>()
            .map_err(|_| RubricError::UnknownRoute { field, value: v }),
    };

    let default = parse_route(raw.default, "default", defaults.default)?;
    let missing_info_action = parse_route(
        raw.missing_info_action,
        "missing_info_action",
        defaults.missing_info_action,
    )?;

    let confidence_threshold = raw
        .confidence_threshold
        .unwrap_or(defaults.confidence_threshold);
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(RubricError::InvalidThreshold(confidence_threshold));
    }

    debug!(
        default = %default,
        confidence_threshold,
        missing_info_action = %missing_info_action,
        "Validated routing policy"
    );

    Ok(RoutingPolicy {
        default,
        confidence_threshold,
        missing_info_action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FLAGS: &str = r#"
red_flags:
  - code: PII_COLLECTION
    keywords: ["주민등록번호"]
    reason: 민감정보
    severity: critical
question_templates:
  - category: exposure
    question: 노출 범위는?
    options: ["public", "internal_test"]
    trigger_if_unknown: true
safe_guardrails:
  - condition: data_collection
    text: 개인정보 수집 동의를 받으세요.
"#;

    fn with_policy(policy: &str) -> String {
        format!("version: \"1.0\"\n{FLAGS}{policy}")
    }

    #[test]
    fn test_parse_valid_rubric() {
        let rubric = parse_rubric(&with_policy(
            "routing_policy:\n  default: PROCEED\n  confidence_threshold: 0.8\n  missing_info_action: ESCALATE\n",
        ))
        .unwrap();
        assert_eq!(rubric.version, "1.0");
        assert_eq!(rubric.red_flags.len(), 1);
        assert_eq!(rubric.red_flags[0].severity, Severity::Critical);
        assert_eq!(rubric.routing_policy.default, Route::Proceed);
        assert_eq!(rubric.routing_policy.confidence_threshold, 0.8);
        assert!(rubric.question_templates[0].trigger_if_unknown);
        assert!(rubric.question_templates[0].trigger_if_contains.is_empty());
    }

    #[test]
    fn test_missing_routing_policy_is_fatal() {
        let err = parse_rubric(&format!("version: \"1.0\"\n{FLAGS}")).unwrap_err();
        assert!(matches!(err, RubricError::MissingSection("routing_policy")));
    }

    #[test]
    fn test_missing_version_is_fatal() {
        let err = parse_rubric(&format!("{FLAGS}routing_policy: {{}}\n")).unwrap_err();
        assert!(matches!(err, RubricError::MissingSection("version")));
    }

    #[test]
    fn test_unquoted_version_is_rejected() {
        for version in ["2.0", "3", "true"] {
            let err = parse_rubric(&format!("version: {version}\n{FLAGS}routing_policy: {{}}\n"))
                .unwrap_err();
            assert!(matches!(err, RubricError::VersionNotText), "{version}: {err}");
        }
    }

    #[test]
    fn test_question_template_requires_options() {
        let yaml = with_policy("routing_policy: {}\n")
            .replace("    options: [\"public\", \"internal_test\"]\n", "");
        let err = parse_rubric(&yaml).unwrap_err();
        assert!(matches!(
            err,
            RubricError::MissingField {
                section: "question_templates",
                index: 0,
                field: "options"
            }
        ));

        let yaml = with_policy("routing_policy: {}\n")
            .replace("[\"public\", \"internal_test\"]", "[]");
        assert!(parse_rubric(&yaml).unwrap().question_templates[0].options.is_empty());
    }

    #[test]
    fn test_policy_fields_default_inside_present_section() {
        let rubric = parse_rubric(&with_policy("routing_policy: {}\n")).unwrap();
        assert_eq!(rubric.routing_policy, RoutingPolicy::default());
        assert_eq!(rubric.routing_policy.confidence_threshold, 0.7);
    }

    #[test]
    fn test_legacy_route_spellings() {
        let rubric = parse_rubric(&with_policy(
            "routing_policy:\n  default: TYPE_2\n  missing_info_action: TYPE_1\n",
        ))
        .unwrap();
        assert_eq!(rubric.routing_policy.default, Route::Proceed);
        assert_eq!(rubric.routing_policy.missing_info_action, Route::Escalate);
    }

    #[test]
    fn test_zero_threshold_is_kept() {
        let rubric =
            parse_rubric(&with_policy("routing_policy:\n  confidence_threshold: 0\n")).unwrap();
        assert_eq!(rubric.routing_policy.confidence_threshold, 0.0);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = parse_rubric(&with_policy("routing_policy:\n  confidence_threshold: 1.5\n"))
            .unwrap_err();
        assert!(matches!(err, RubricError::InvalidThreshold(t) if t == 1.5));

        let err = parse_rubric(&with_policy("routing_policy:\n  confidence_threshold: .nan\n"))
            .unwrap_err();
        assert!(matches!(err, RubricError::InvalidThreshold(_)));
    }

    #[test]
    fn test_unknown_route() {
        let err =
            parse_rubric(&with_policy("routing_policy:\n  default: REVIEW\n")).unwrap_err();
        assert!(matches!(
            err,
            RubricError::UnknownRoute { field: "default", .. }
        ));
    }

    #[test]
    fn test_red_flag_validation() {
        let base = |flag: &str| {
            format!(
                "version: \"1\"\nred_flags:\n{flag}question_templates: []\nsafe_guardrails: []\nrouting_policy: {{}}\n"
            )
        };

        let err = parse_rubric(&base(
            "  - code: A\n    keywords: []\n    reason: r\n    severity: high\n",
        ))
        .unwrap_err();
        assert!(matches!(err, RubricError::EmptyKeywords { ref code } if code == "A"));

        let err = parse_rubric(&base(
            "  - code: A\n    keywords: [\"\"]\n    reason: r\n    severity: high\n",
        ))
        .unwrap_err();
        assert!(matches!(err, RubricError::EmptyKeyword { .. }));

        let err = parse_rubric(&base(
            "  - code: A\n    keywords: [x]\n    reason: r\n    severity: severe\n",
        ))
        .unwrap_err();
        assert!(matches!(err, RubricError::UnknownSeverity { .. }));

        let err = parse_rubric(&base("  - keywords: [x]\n    reason: r\n    severity: low\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            RubricError::MissingField {
                section: "red_flags",
                index: 0,
                field: "code"
            }
        ));

        let err = parse_rubric(&base(
            "  - code: A\n    keywords: [x]\n    reason: r\n    severity: low\n  - code: A\n    keywords: [y]\n    reason: r\n    severity: low\n",
        ))
        .unwrap_err();
        assert!(matches!(err, RubricError::DuplicateCode(ref c) if c == "A"));
    }

    #[test]
    fn test_mistyped_section_is_parse_error() {
        let err = parse_rubric(
            "version: \"1\"\nred_flags: \"oops\"\nquestion_templates: []\nsafe_guardrails: []\nrouting_policy: {}\n",
        )
        .unwrap_err();
        assert!(matches!(err, RubricError::Parse(_)));
    }

    #[test]
    fn test_unknown_guardrail_condition_is_accepted() {
        let rubric = parse_rubric(
            "version: \"1\"\nred_flags: []\nquestion_templates: []\nsafe_guardrails:\n  - condition: weather\n    text: 우산을 챙기세요.\nrouting_policy: {}\n",
        )
        .unwrap();
        assert_eq!(rubric.safe_guardrails[0].condition, "weather");
    }

    #[test]
    fn test_load_rubric_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", with_policy("routing_policy: {}\n")).unwrap();
        let rubric = load_rubric(file.path()).unwrap();
        assert_eq!(rubric.version, "1.0");
    }

    #[test]
    fn test_load_rubric_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rubric(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, RubricError::NotFound { .. }));
    }
}
