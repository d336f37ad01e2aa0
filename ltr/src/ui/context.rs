//! Output context shared by every command.

use super::theme::Theme;
use anyhow::Result;
use is_terminal::IsTerminal;
use serde::Serialize;

/// How a command should print its results.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    json: bool,
    theme: Theme,
}

impl OutputContext {
    /// Resolves color from the config value, `--no-color`, `NO_COLOR` and
    /// whether stdout is a terminal.
    pub fn detect(color_configured: bool, no_color_flag: bool, json: bool) -> Self {
        let color = color_configured
            && !no_color_flag
            && !json
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Self::new(json, color)
    }

    pub fn new(json: bool, color: bool) -> Self {
        Self {
            json,
            theme: Theme::new(color),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Prints a value as pretty JSON on stdout.
    pub fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
