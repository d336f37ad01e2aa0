//! Terminal presentation: output mode, color theme and status glyphs.

pub mod context;
pub mod theme;

pub use context::OutputContext;
pub use theme::{StatusIndicator, Theme};
