//! Command implementations for the `ltr` binary.

pub mod cases;
pub mod check;
pub mod config;
pub mod helpers;
pub mod rubric;
pub mod schema;
pub mod stats;

pub use check::{CheckArgs, check, quick};
pub use config::config_show;
pub use schema::schema;
pub use stats::stats;
