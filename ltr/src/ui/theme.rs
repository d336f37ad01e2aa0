//! Color theme built on `colored`.
//!
//! Every helper returns a plain `String` when color is disabled, so rendered
//! text can be compared byte for byte in tests.

use colored::{ColoredString, Colorize};
use ltr_common::{Route, Severity};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    enabled: bool,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.enabled {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }

    pub fn note(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().italic())
    }

    pub fn highlight(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().bold())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    /// Section title in the given tone.
    pub fn format_header(&self, text: &str, tone: Tone) -> String {
        self.paint(text, |t| match tone {
            Tone::Danger => t.red().bold(),
            Tone::Caution => t.yellow().bold(),
            Tone::Info => t.blue().bold(),
        })
    }

    pub fn route(&self, route: Route) -> String {
        self.paint(route.as_str(), |t| match route {
            Route::Escalate => t.red().bold(),
            Route::Proceed => t.green().bold(),
        })
    }

    /// `[CRITICAL]` style badge.
    pub fn severity_badge(&self, severity: Severity) -> String {
        let badge = format!("[{}]", severity.as_str().to_ascii_uppercase());
        self.paint(&badge, |t| match severity {
            Severity::Critical => t.on_red().white().bold(),
            Severity::High => t.red().bold(),
            Severity::Medium => t.yellow().bold(),
            Severity::Low => t.blue(),
        })
    }

    /// Colors by confidence band: >= 0.8 green, >= 0.6 yellow, else red.
    pub fn confidence(&self, text: &str, confidence: f64) -> String {
        if confidence >= 0.8 {
            self.success(text)
        } else if confidence >= 0.6 {
            self.warning(text)
        } else {
            self.error(text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Danger,
    Caution,
    Info,
}

/// Leading glyph for status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Success,
    Error,
    Warning,
    Info,
}

impl StatusIndicator {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Success => "[v]",
            Self::Error => "[x]",
            Self::Warning => "[!]",
            Self::Info => "[i]",
        }
    }

    pub fn display(&self, style: &Theme) -> String {
        match self {
            Self::Success => style.success(self.symbol()),
            Self::Error => style.error(self.symbol()),
            Self::Warning => style.warning(self.symbol()),
            Self::Info => style.muted(self.symbol()),
        }
    }
}
