//! `ltr stats`: audit log statistics.

use crate::render::render_stats;
use crate::ui::OutputContext;
use anyhow::Result;
use ltr_common::{AuditLogger, AuditOptions, LtrConfig};
use std::path::PathBuf;

pub fn stats(config: &LtrConfig, file: Option<PathBuf>, ctx: &OutputContext) -> Result<()> {
    let log_file = file.unwrap_or_else(|| config.audit_log_path());
    let logger = AuditLogger::new(AuditOptions {
        enabled: true,
        log_file,
    });
    let summary = logger.summary()?;

    if ctx.is_json() {
        return ctx.json(&summary);
    }
    println!("{}", render_stats(&summary, logger.log_file(), ctx.theme()));
    Ok(())
}
