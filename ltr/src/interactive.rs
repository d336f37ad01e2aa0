//! Interactive prompts for `ltr check`.

use anyhow::{Result, bail};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use is_terminal::IsTerminal;
use ltr_common::{
    CrossBorder, DataUsage, Exposure, ExternalCommunication, RevenueModel, TriageInput,
};
use std::fmt::Display;

const SKIP: &str = "(skip)";

/// Asks for the description and each structured field. Every field may be
/// skipped, which leaves it unset.
pub fn prompt_input() -> Result<TriageInput> {
    if !std::io::stdin().is_terminal() {
        bail!("interactive mode needs a terminal; pass --description instead");
    }

    let theme = ColorfulTheme::default();
    println!("\n=== Legal Triage Interactive Mode ===\n");

    let description: String = Input::with_theme(&theme)
        .with_prompt("Describe your product idea/feature/campaign")
        .interact_text()?;

    println!("\nOptional fields (choose {SKIP} to leave unset):\n");

    Ok(TriageInput {
        description,
        exposure: select(&theme, "Exposure scope", Exposure::ALL)?,
        data_usage: select(&theme, "Data usage", DataUsage::ALL)?,
        revenue_model: select(&theme, "Revenue model", RevenueModel::ALL)?,
        external_communication: select(
            &theme,
            "External communication",
            ExternalCommunication::ALL,
        )?,
        cross_border: select(&theme, "Cross-border scope", CrossBorder::ALL)?,
    })
}

fn select<T: Copy + Display>(theme: &ColorfulTheme, label: &str, options: &[T]) -> Result<Option<T>> {
    let items = skip_then(options);
    let choice = Select::with_theme(theme)
        .with_prompt(label)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(choice_to_value(options, choice))
}

fn skip_then<T: Display>(options: &[T]) -> Vec<String> {
    std::iter::once(SKIP.to_string())
        .chain(options.iter().map(ToString::to_string))
        .collect()
}

/// Index 0 is the skip entry.
fn choice_to_value<T: Copy>(options: &[T], choice: usize) -> Option<T> {
    choice.checked_sub(1).and_then(|i| options.get(i).copied())
}
