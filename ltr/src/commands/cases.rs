//! `ltr cases ...`: case corpus maintenance.

use super::helpers::{corpus, indent_lines, load_engine, plural};
use crate::ui::{OutputContext, StatusIndicator};
use anyhow::Result;
use ltr_common::LtrConfig;
use ltr_common::cases::{
    CaseCheck, CaseError, FileCheck, RegressionSuite, check_case, run_regression,
};
use std::path::{Path, PathBuf};

pub fn ingest(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let corpus = corpus(config);
    let entries = corpus.ingest()?;
    let path = corpus.save_index(&entries)?;

    for entry in &entries {
        let decision = entry
            .decision
            .map(|d| d.as_str())
            .unwrap_or("(undecided)");
        println!(
            "  {} {} {}",
            style.highlight(&entry.case_id),
            style.muted(decision),
            entry.title
        );
    }
    println!(
        "{} Indexed {} -> {}",
        StatusIndicator::Success.display(style),
        plural(entries.len(), "case"),
        path.display()
    );
    Ok(())
}

fn print_file_check(file: &FileCheck, ctx: &OutputContext) {
    let style = ctx.theme();
    let name = file
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.file.display().to_string());
    if file.passed {
        println!("    {} {}", StatusIndicator::Success.display(style), name);
        return;
    }
    println!(
        "    {} {} ({})",
        StatusIndicator::Error.display(style),
        name,
        plural(file.issues.len(), "issue")
    );
    for issue in &file.issues {
        let text = format!(
            "{}:{} [{}] {}\n  -> {}",
            issue.line, issue.column, issue.kind, issue.matched, issue.suggestion
        );
        println!("{}", indent_lines(&text, "        "));
    }
}

/// Checks one case folder, or every indexed case when none is given.
/// Fails when any case carries personal data.
pub fn anonymize(config: &LtrConfig, case_dir: Option<PathBuf>, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let checks = match case_dir {
        Some(dir) => vec![check_single(&dir)?],
        None => corpus(config).check_all()?,
    };

    for check in &checks {
        let indicator = if check.passed() {
            StatusIndicator::Success
        } else {
            StatusIndicator::Error
        };
        println!("{} {}", indicator.display(style), style.bold(&check.case_id));
        for file in &check.files {
            print_file_check(file, ctx);
        }
    }

    let failed = checks.iter().filter(|c| !c.passed()).count();
    println!();
    if failed > 0 {
        return Err(CaseError::AnonymizationFailed { failed }.into());
    }
    println!(
        "{} {} passed the anonymization check",
        StatusIndicator::Success.display(style),
        plural(checks.len(), "case")
    );
    Ok(())
}

fn check_single(dir: &Path) -> Result<CaseCheck, CaseError> {
    if !dir.is_dir() {
        return Err(CaseError::DirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let case_id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    Ok(CaseCheck {
        case_id,
        files: check_case(dir)?,
    })
}

pub fn extract(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let summaries = corpus(config).extract_all()?;

    for summary in &summaries {
        match &summary.saved_to {
            Some(path) => println!(
                "  {} {} -> {}",
                style.highlight(&summary.case_id),
                plural(summary.rules, "candidate"),
                path.display()
            ),
            None => println!(
                "  {} {}",
                style.highlight(&summary.case_id),
                style.muted("no candidates")
            ),
        }
    }

    let total: usize = summaries.iter().map(|s| s.rules).sum();
    println!(
        "{} Extracted {} from {}",
        StatusIndicator::Success.display(style),
        plural(total, "rule candidate"),
        plural(summaries.len(), "case")
    );
    if total > 0 {
        println!(
            "{}",
            style.muted(
                "Review each extracted_rules.yaml (set reviewed/approved), then run 'ltr rubric propose'."
            )
        );
    }
    Ok(())
}

pub fn gen_fixtures(config: &LtrConfig, preview: bool, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let suite = RegressionSuite::new(corpus(config).generate_fixtures()?);

    if preview {
        println!("{}", suite.to_json()?);
        return Ok(());
    }

    let path = &config.regression_path.value;
    suite.save(path)?;
    println!(
        "{} Wrote {} -> {}",
        StatusIndicator::Success.display(style),
        plural(suite.fixtures.len(), "fixture"),
        path.display()
    );
    Ok(())
}

/// Replays the saved fixtures; fails when any case no longer reproduces.
pub fn regress(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let engine = load_engine(config)?;
    let suite = RegressionSuite::load(&config.regression_path.value)?;
    let report = run_regression(&engine, &suite.fixtures);

    for outcome in &report.outcomes {
        let indicator = if outcome.passed() {
            StatusIndicator::Success
        } else {
            StatusIndicator::Error
        };
        println!(
            "{} {} expected={} actual={} confidence={:.2}",
            indicator.display(style),
            style.bold(&outcome.case_id),
            outcome.expected_route,
            style.route(outcome.actual_route),
            outcome.confidence
        );
        if !outcome.missing_codes.is_empty() {
            println!(
                "      {}",
                style.warning(&format!("missing codes: {}", outcome.missing_codes.join(", ")))
            );
        }
    }

    println!();
    println!(
        "Regression: {}/{} passed (rubric {})",
        report.passed(),
        report.total(),
        engine.rubric().version
    );
    report.into_result()?;
    Ok(())
}
