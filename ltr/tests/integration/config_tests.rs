use crate::common::{TestEnv, assert_contains, init_test_logging};

fn row<'a>(rows: &'a serde_json::Value, key: &str) -> &'a serde_json::Value {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|r| r["key"] == key)
        .unwrap_or_else(|| panic!("no row for {key}"))
}

#[test]
fn test_config_show_reports_file_sources() {
    init_test_logging();
    crate::test_log!("TEST START: test_config_show_reports_file_sources");
    let env = TestEnv::new();

    let run = env.run(&["config", "show", "--json"]);
    assert!(run.success, "config show failed: {}", run.stderr);
    let rows = run.json();

    let rubric = row(&rows, "rubric_path");
    assert_eq!(rubric["value"], env.rubric.display().to_string());
    assert_eq!(
        rubric["source"],
        format!("file:{}", env.config.display())
    );
    assert_eq!(row(&rows, "output.color")["value"], "false");
    crate::test_log!("TEST PASS: test_config_show_reports_file_sources");
}

#[test]
fn test_env_and_cli_override_file() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run_with_env(
        &["config", "show", "--json"],
        &[("LTR_AUDIT_ENABLED", "false")],
    );
    assert!(run.success, "config show failed: {}", run.stderr);
    let rows = run.json();
    let audit = row(&rows, "audit.enabled");
    assert_eq!(audit["value"], "false");
    assert_eq!(audit["source"], "env:LTR_AUDIT_ENABLED");

    let run = env.run(&["config", "show", "--json", "--rubric", "other.yaml"]);
    let rows = run.json();
    assert_eq!(row(&rows, "rubric_path")["source"], "cli:--rubric");
}

#[test]
fn test_invalid_env_value_is_rejected() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run_with_env(&["config", "show"], &[("LTR_AUDIT_ENABLED", "maybe")]);
    assert!(!run.success);
    assert_contains(&run.stderr, "LTR_AUDIT_ENABLED");
}

#[test]
fn test_config_show_text() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["config", "show"]);
    assert!(run.success);
    assert_contains(&run.stdout, "Config file:");
    assert_contains(&run.stdout, "cases.regression_path");
}
