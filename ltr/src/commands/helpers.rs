//! Shared helper functions for ltr commands.

use anyhow::{Context, Result};
use ltr_common::cases::CaseCorpus;
use ltr_common::{LtrConfig, TriageEngine};
use tracing::debug;

/// Indent each line of text with a given prefix.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
    }
    out
}

/// Builds the engine from the configured rubric.
pub fn load_engine(config: &LtrConfig) -> Result<TriageEngine> {
    let path = &config.rubric_path;
    debug!(path = %path.value.display(), source = %path.source, "Loading rubric");
    TriageEngine::from_path(&path.value)
        .with_context(|| format!("loading rubric from {}", path.value.display()))
}

pub fn corpus(config: &LtrConfig) -> CaseCorpus {
    CaseCorpus::new(config.cases_dir.value.clone())
}

/// `"1 case"` / `"2 cases"`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
