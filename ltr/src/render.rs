//! Text renderings of triage results, audit statistics and proposals.

use crate::ui::Theme;
use crate::ui::theme::Tone;
use ltr_common::audit::AuditSummary;
use ltr_common::rubric::update::RubricUpdateProposal;
use ltr_common::{DetectedRedFlag, NextStep, Route, TriageOutput};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Inner width of the report frame.
pub const REPORT_WIDTH: usize = 59;
const CONFIDENCE_BAR_WIDTH: usize = 20;
const RULE_WIDTH: usize = 55;

const DISCLAIMER: [&str; 2] = [
    "* This is a risk triage result, NOT legal advice.",
    "* When in doubt, always consult with the legal team.",
];

/// Centers text by display width, padding both sides with spaces.
pub fn center(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        return text.to_string();
    }
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Pads text on the right up to a display width.
pub fn pad_right(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - used))
    }
}

/// `[#####-----]` with the value clamped to `[0, 1]`.
pub fn confidence_bar(value: f64, width: usize) -> String {
    let filled = ((value.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn confidence_line(confidence: f64, style: &Theme) -> String {
    let percent = (confidence * 100.0).round() as i64;
    let bar = confidence_bar(confidence, CONFIDENCE_BAR_WIDTH);
    format!("{} {percent}%", style.confidence(&bar, confidence))
}

fn next_step_line(step: NextStep, style: &Theme) -> String {
    let text = format!("{} - {}", step.as_str(), step.label());
    match step {
        NextStep::LegalReview => style.error(&text),
        NextStep::ProceedWithGuardrails => style.success(&text),
    }
}

fn red_flag_lines(flag: &DetectedRedFlag, style: &Theme, lines: &mut Vec<String>) {
    lines.push(format!(
        "  {} {}",
        style.severity_badge(flag.severity),
        style.bold(&flag.code)
    ));
    lines.push(format!("     Reason: {}", flag.reason));
    lines.push(format!("     Matched: {}", flag.matched_keywords.join(", ")));
}

/// Full human-readable report.
pub fn render_report(output: &TriageOutput, style: &Theme) -> String {
    let frame = "═".repeat(REPORT_WIDTH);
    let rule = style.muted(&"─".repeat(RULE_WIDTH));
    let mut lines = vec![
        style.bold(&frame),
        style.bold(&center("LEGAL TRIAGE RESULT", REPORT_WIDTH)),
        style.bold(&frame),
        String::new(),
    ];

    let marker = match output.routing {
        Route::Escalate => "[!]",
        Route::Proceed => "[v]",
    };
    lines.push(format!(
        "{marker} Routing: {} ({})",
        style.route(output.routing),
        output.routing.label()
    ));
    lines.push(format!(
        "   Confidence: {}",
        confidence_line(output.confidence, style)
    ));
    lines.push(format!(
        "   Next Step: {}",
        next_step_line(output.recommended_next_step, style)
    ));
    lines.push(format!("   Rule: {}", style.muted(output.routing_rule.as_str())));
    lines.push(String::new());

    if !output.red_flags.is_empty() {
        lines.push(style.format_header("RED FLAGS DETECTED:", Tone::Danger));
        lines.push(rule.clone());
        for flag in &output.red_flags {
            red_flag_lines(flag, style, &mut lines);
        }
        lines.push(String::new());
    }

    if !output.missing_info_questions.is_empty() {
        lines.push(style.format_header("MISSING INFORMATION:", Tone::Caution));
        lines.push(rule.clone());
        lines.extend(
            output
                .missing_info_questions
                .iter()
                .map(|q| format!("  [?] {q}")),
        );
        lines.push(String::new());
    }

    if !output.safe_guardrails.is_empty() {
        lines.push(style.format_header("REQUIRED GUARDRAILS:", Tone::Info));
        lines.push(rule);
        lines.extend(output.safe_guardrails.iter().map(|g| format!("  [>] {g}")));
        lines.push(String::new());
    }

    lines.push(style.muted(&"─".repeat(REPORT_WIDTH)));
    lines.push(style.muted(&format!("Timestamp: {}", output.timestamp)));
    lines.push(style.muted(&format!("Input Hash: {}", output.input_hash)));
    lines.push(String::new());
    lines.extend(DISCLAIMER.iter().map(|line| style.note(line)));

    lines.join("\n")
}

/// The full output record as JSON.
pub fn render_json(output: &TriageOutput, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    }
}

/// `[ROUTE] confidence=0.95 flags=A,B next=LEGAL_REVIEW`
pub fn render_summary(output: &TriageOutput) -> String {
    let flags = output.flag_codes().collect::<Vec<_>>().join(",");
    format!(
        "[{}] confidence={:.2} flags={} next={}",
        output.routing,
        output.confidence,
        if flags.is_empty() { "none" } else { &flags },
        output.recommended_next_step
    )
}

/// Rounded share of `total`, `0%` when there is nothing to divide.
pub fn percent(value: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", ((value as f64 / total as f64) * 100.0).round() as u64)
}

pub fn render_stats(summary: &AuditSummary, log_file: &Path, style: &Theme) -> String {
    let mut lines = vec![
        style.bold("=== Legal Triage Statistics ==="),
        style.muted(&format!("Log: {}", log_file.display())),
        String::new(),
        format!("Total triages: {}", summary.total),
        format!(
            "{} (Legal Review): {} ({})",
            style.route(Route::Escalate),
            summary.escalate,
            percent(summary.escalate, summary.total)
        ),
        format!(
            "{} (Proceed): {} ({})",
            style.route(Route::Proceed),
            summary.proceed,
            percent(summary.proceed, summary.total)
        ),
        String::new(),
        "Top Red Flags:".to_string(),
    ];
    if summary.top_flags.is_empty() {
        lines.push(style.muted("  (none)"));
    }
    lines.extend(
        summary
            .top_flags
            .iter()
            .map(|flag| format!("  - {}: {}", flag.code, flag.count)),
    );
    lines.join("\n")
}

pub fn render_proposal(proposal: &RubricUpdateProposal, saved_to: Option<&Path>) -> String {
    let banner = "=".repeat(60);
    let mut lines = vec![
        banner.clone(),
        "Rubric Update Proposal".to_string(),
        banner.clone(),
        String::new(),
        format!("Source cases: {}", proposal.source_cases.join(", ")),
        format!("New red flags: {}", proposal.new_red_flags.len()),
        format!("Modified red flags: {}", proposal.modified_red_flags.len()),
        format!("New guardrails: {}", proposal.new_guardrails.len()),
        String::new(),
        proposal.diff_preview.trim_end().to_string(),
        String::new(),
        banner,
    ];
    if let Some(path) = saved_to {
        lines.push(format!("Saved to: {}", path.display()));
        lines.push("Review the file, then run 'ltr rubric apply --yes' to update the rubric.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltr_common::audit::FlagCount;
    use ltr_common::{RoutingRule, Severity};

    fn escalated() -> TriageOutput {
        TriageOutput {
            routing: Route::Escalate,
            confidence: 0.95,
            routing_rule: RoutingRule::CriticalFlag,
            red_flags: vec![DetectedRedFlag {
                code: "PII_COLLECTION".to_string(),
                reason: "민감 개인정보 수집".to_string(),
                matched_keywords: vec!["주민등록번호".to_string()],
                severity: Severity::Critical,
            }],
            missing_info_questions: vec!["노출 범위는 어디까지인가요?".to_string()],
            safe_guardrails: vec!["개인정보 수집 동의를 받으세요.".to_string()],
            recommended_next_step: NextStep::LegalReview,
            timestamp: "2026-01-07T09:00:00.000Z".to_string(),
            input_hash: "0123456789abcdef".to_string(),
        }
    }

    #[test]
    fn test_summary_line() {
        insta::assert_snapshot!(
            render_summary(&escalated()),
            @"[ESCALATE] confidence=0.95 flags=PII_COLLECTION next=LEGAL_REVIEW"
        );
    }

    #[test]
    fn test_summary_without_flags() {
        let mut output = escalated();
        output.red_flags.clear();
        output.routing = Route::Proceed;
        output.confidence = 0.9;
        output.recommended_next_step = NextStep::ProceedWithGuardrails;
        assert_eq!(
            render_summary(&output),
            "[PROCEED] confidence=0.90 flags=none next=PROCEED_WITH_GUARDRAILS"
        );
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.95, 20), "[###################-]");
        assert_eq!(confidence_bar(0.5, 10), "[#####-----]");
        assert_eq!(confidence_bar(-0.05, 4), "[----]");
        assert_eq!(confidence_bar(1.5, 4), "[####]");
    }

    #[test]
    fn test_report_sections() {
        let report = render_report(&escalated(), &Theme::new(false));
        assert!(report.contains("LEGAL TRIAGE RESULT"));
        assert!(report.contains("[!] Routing: ESCALATE (법무 검토 필요)"));
        assert!(report.contains("   Confidence: [###################-] 95%"));
        assert!(report.contains("  [CRITICAL] PII_COLLECTION"));
        assert!(report.contains("     Matched: 주민등록번호"));
        assert!(report.contains("  [?] 노출 범위는 어디까지인가요?"));
        assert!(report.contains("  [>] 개인정보 수집 동의를 받으세요."));
        assert!(report.contains("Input Hash: 0123456789abcdef"));
        assert!(report.ends_with(DISCLAIMER[1]));
    }

    #[test]
    fn test_report_omits_empty_sections() {
        let mut output = escalated();
        output.red_flags.clear();
        output.missing_info_questions.clear();
        let report = render_report(&output, &Theme::new(false));
        assert!(!report.contains("RED FLAGS DETECTED"));
        assert!(!report.contains("MISSING INFORMATION"));
        assert!(report.contains("REQUIRED GUARDRAILS"));
    }

    #[test]
    fn test_json_never_contains_description_field() {
        let json = render_json(&escalated(), false).unwrap();
        assert!(json.contains("\"matchedKeywords\""));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_center_uses_display_width() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("가나", 6), " 가나 ");
        assert_eq!(pad_right("가", 4), "가  ");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), "0%");
        assert_eq!(percent(1, 3), "33%");
        assert_eq!(percent(2, 3), "67%");
    }

    #[test]
    fn test_stats_lists_top_flags() {
        let summary = AuditSummary {
            total: 4,
            escalate: 3,
            proceed: 1,
            top_flags: vec![FlagCount {
                code: "PRICE_DISCOUNT_EVENT".to_string(),
                count: 2,
            }],
        };
        let text = render_stats(&summary, Path::new("audit.jsonl"), &Theme::new(false));
        assert!(text.contains("Total triages: 4"));
        assert!(text.contains("ESCALATE (Legal Review): 3 (75%)"));
        assert!(text.contains("PROCEED (Proceed): 1 (25%)"));
        assert!(text.contains("  - PRICE_DISCOUNT_EVENT: 2"));
    }

    proptest::proptest! {
        #[test]
        fn prop_confidence_bar_has_fixed_width(value in -2.0f64..3.0, width in 1usize..40) {
            let bar = confidence_bar(value, width);
            proptest::prop_assert_eq!(bar.chars().count(), width + 2);
        }

        #[test]
        fn prop_padding_reaches_width(text in "\\PC{0,12}", width in 0usize..30) {
            let padded = pad_right(&text, width);
            proptest::prop_assert!(padded.width() >= width);
            proptest::prop_assert!(padded.starts_with(&text));
            proptest::prop_assert!(center(&text, width).width() >= width.min(text.width()));
        }
    }
}
