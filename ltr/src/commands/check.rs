//! `ltr check` and `ltr quick`.

use super::helpers::load_engine;
use crate::interactive;
use crate::render::{render_json, render_report, render_summary};
use crate::ui::OutputContext;
use anyhow::Result;
use clap::Args;
use ltr_common::{
    AuditLogger, CrossBorder, DataUsage, Exposure, ExternalCommunication, LtrConfig,
    RevenueModel, TriageInput,
};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Default, Args)]
pub struct CheckArgs {
    /// Description of the idea, feature or campaign
    #[arg(short, long)]
    pub description: Option<String>,

    /// Exposure scope: public|members_only|specific_group|internal_test
    #[arg(short, long, value_parser = Exposure::from_str)]
    pub exposure: Option<Exposure>,

    /// Data usage: collects|no_collection|unclear
    #[arg(short = 'u', long, value_parser = DataUsage::from_str)]
    pub data_usage: Option<DataUsage>,

    /// Revenue model: free|paid_once|subscription|ads|commission
    #[arg(short, long, value_parser = RevenueModel::from_str)]
    pub revenue: Option<RevenueModel>,

    /// External communication: customer_facing|media|internal
    #[arg(short, long, value_parser = ExternalCommunication::from_str)]
    pub communication: Option<ExternalCommunication>,

    /// Cross-border scope: domestic_only|includes_overseas|unclear
    #[arg(short = 'b', long, value_parser = CrossBorder::from_str)]
    pub cross_border: Option<CrossBorder>,

    /// Output as JSON only
    #[arg(short, long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Do not append to the audit log
    #[arg(long)]
    pub no_log: bool,

    /// Prompt for every field
    #[arg(short, long)]
    pub interactive: bool,
}

impl CheckArgs {
    /// The request described by the flags, or `None` when prompts are needed.
    pub fn to_input(&self) -> Option<TriageInput> {
        if self.interactive {
            return None;
        }
        let description = self.description.clone()?;
        Some(TriageInput {
            description,
            exposure: self.exposure,
            data_usage: self.data_usage,
            revenue_model: self.revenue,
            external_communication: self.communication,
            cross_border: self.cross_border,
        })
    }
}

pub fn check(config: &LtrConfig, args: &CheckArgs) -> Result<()> {
    let engine = load_engine(config)?;
    let ctx = OutputContext::detect(config.output_color.value, args.no_color, args.json);

    let input = match args.to_input() {
        Some(input) => input,
        None => interactive::prompt_input()?,
    };

    let output = engine.triage(&input);
    debug!(route = %output.routing, audited = !args.no_log, "Checked submission");

    let mut audit_options = config.audit_options();
    if args.no_log {
        audit_options.enabled = false;
    }
    let logger = AuditLogger::new(audit_options).with_rubric_version(engine.rubric().version.clone());
    logger.log(&output);

    if ctx.is_json() {
        println!("{}", render_json(&output, true)?);
    } else {
        println!("{}", render_report(&output, ctx.theme()));
        println!("\n--- JSON Output ---");
        println!("{}", render_json(&output, true)?);
    }
    Ok(())
}

/// One-line summary; never audited.
pub fn quick(config: &LtrConfig, description: &str) -> Result<()> {
    let engine = load_engine(config)?;
    let output = engine.triage(&TriageInput::new(description));
    println!("{}", render_summary(&output));
    Ok(())
}
