//! `ltr config show`: effective configuration with value sources.

use crate::render::pad_right;
use crate::ui::OutputContext;
use anyhow::Result;
use ltr_common::LtrConfig;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigRow<'a> {
    key: &'a str,
    value: String,
    source: String,
}

fn rows(config: &LtrConfig) -> Vec<ConfigRow<'_>> {
    config
        .entries()
        .into_iter()
        .map(|(key, value, source)| ConfigRow {
            key,
            value,
            source: source.to_string(),
        })
        .collect()
}

pub fn config_show(config: &LtrConfig, ctx: &OutputContext) -> Result<()> {
    let rows = rows(config);
    if ctx.is_json() {
        return ctx.json(&rows);
    }

    let style = ctx.theme();
    let file = config
        .config_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    println!("{} {}", style.bold("Config file:"), file);
    println!();

    let key_width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|r| unicode_width::UnicodeWidthStr::width(r.value.as_str()))
        .max()
        .unwrap_or(0);
    for row in &rows {
        println!(
            "  {} = {}  {}",
            style.highlight(&pad_right(row.key, key_width)),
            pad_right(&row.value, value_width),
            style.muted(&format!("({})", row.source))
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_report_default_sources() {
        let config = LtrConfig::default();
        let rows = rows(&config);
        let rubric = rows.iter().find(|r| r.key == "rubric_path").unwrap();
        assert_eq!(rubric.value, "rubric.yaml");
        assert_eq!(rubric.source, "default");
    }
}
