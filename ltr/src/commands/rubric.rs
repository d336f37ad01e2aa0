//! `ltr rubric ...`: inspect the rubric and manage update proposals.

use super::helpers::{corpus, plural};
use crate::render::render_proposal;
use crate::ui::{OutputContext, StatusIndicator};
use anyhow::Result;
use ltr_common::rubric::update::{RubricUpdateProposal, apply_proposal, generate_proposal};
use ltr_common::{LtrConfig, load_rubric};

pub fn show(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let path = &config.rubric_path;
    let rubric = load_rubric(&path.value)?;

    println!(
        "{} {} {}",
        style.bold("Rubric:"),
        path.value.display(),
        style.muted(&format!("({})", path.source))
    );
    println!("  version: {}", rubric.version);
    println!("  digest: {}", rubric.digest());

    let counts = rubric
        .severity_counts()
        .iter()
        .map(|(severity, count)| format!("{severity}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "  red flags: {} ({counts})",
        rubric.red_flags.len()
    );
    println!("  question templates: {}", rubric.question_templates.len());
    println!("  guardrails: {}", rubric.safe_guardrails.len());
    let policy = &rubric.routing_policy;
    println!(
        "  routing: default={} threshold={} missing_info_action={}",
        policy.default, policy.confidence_threshold, policy.missing_info_action
    );

    println!();
    for flag in &rubric.red_flags {
        println!(
            "  {} {} - {} {}",
            style.severity_badge(flag.severity),
            style.bold(&flag.code),
            flag.reason,
            style.muted(&format!("({})", plural(flag.keywords.len(), "keyword")))
        );
    }
    Ok(())
}

/// Builds a proposal from approved case candidates and saves it for review.
pub fn propose(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let approved = corpus(config).collect_approved_rules()?;
    if approved.is_empty() {
        println!(
            "{} No approved rule candidates. Run 'ltr cases extract' and approve candidates first.",
            StatusIndicator::Warning.display(style)
        );
        return Ok(());
    }

    let rubric = load_rubric(&config.rubric_path.value)?;
    let proposal = generate_proposal(&rubric, &approved);
    if proposal.is_empty() {
        println!(
            "{} All {} are already covered by rubric {}.",
            StatusIndicator::Info.display(style),
            plural(approved.len(), "approved candidate"),
            rubric.version
        );
        return Ok(());
    }

    let path = &config.proposal_path.value;
    proposal.save(path)?;
    println!("{}", render_proposal(&proposal, Some(path)));
    Ok(())
}

/// Applies the saved proposal. Without `--yes` this is a dry run.
pub fn apply(config: &LtrConfig, yes: bool, ctx: &OutputContext) -> Result<()> {
    let style = ctx.theme();
    let proposal = RubricUpdateProposal::load(&config.proposal_path.value)?;
    let rubric_path = &config.rubric_path.value;
    let applied = apply_proposal(rubric_path, &proposal, !yes)?;

    if applied.written {
        println!(
            "{} Rubric updated {} -> {} ({})",
            StatusIndicator::Success.display(style),
            applied.previous_version,
            applied.rubric.version,
            rubric_path.display()
        );
    } else {
        println!("{}", render_proposal(&proposal, None));
        println!(
            "{} Dry run: rubric would move {} -> {}. Re-run with --yes to write {}.",
            StatusIndicator::Info.display(style),
            applied.previous_version,
            applied.rubric.version,
            rubric_path.display()
        );
    }
    Ok(())
}
