//! Test logging.
//!
//! `init_test_logging()` routes `tracing` output through the test writer so it
//! shows up only for failing tests. `init_global_test_logging()` also captures
//! every event as JSON lines in `LTR_TEST_LOG_FILE` (default
//! `target/test-logs/all_tests.jsonl`) for CI debugging.
//!
//! ```ignore
//! use ltr_common::testing::init_test_logging;
//!
//! #[test]
//! fn test_example() {
//!     init_test_logging(); // Safe to call multiple times
//!     tracing::info!("captured by the test writer");
//! }
//! ```

use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

static GLOBAL_LOGGING_INIT: Once = Once::new();

fn test_filter() -> EnvFilter {
    let level = std::env::var("LTR_TEST_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
    EnvFilter::try_new(format!("ltr={level},ltr_common={level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a test-writer subscriber. Later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(test_filter())
        .try_init();
}

/// Installs a test-writer subscriber plus a JSONL capture file. Runs once.
pub fn init_global_test_logging() {
    GLOBAL_LOGGING_INIT.call_once(|| {
        let file_layer = create_global_log_file().map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
        });

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let subscriber = tracing_subscriber::registry()
            .with(test_filter())
            .with(file_layer)
            .with(stderr_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn create_global_log_file() -> Option<std::fs::File> {
    open_capture_file(std::env::var_os("LTR_TEST_LOG_FILE").map(PathBuf::from))
}

fn open_capture_file(custom_path: Option<PathBuf>) -> Option<std::fs::File> {
    if let Some(custom_path) = custom_path {
        if let Some(parent) = custom_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        return std::fs::File::create(&custom_path).ok();
    }

    let log_dir = find_target_dir().join("test-logs");
    let _ = std::fs::create_dir_all(&log_dir);
    std::fs::File::create(log_dir.join("all_tests.jsonl")).ok()
}

fn find_target_dir() -> PathBuf {
    if let Ok(target_dir) = std::env::var("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir);
    }

    let mut cwd = std::env::current_dir().unwrap_or_default();
    loop {
        let target = cwd.join("target");
        if target.is_dir() {
            return target;
        }
        if !cwd.pop() {
            return PathBuf::from("target");
        }
    }
}
