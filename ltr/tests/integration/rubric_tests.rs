use std::fs;

use crate::common::{TestEnv, assert_contains, init_test_logging};

const PROPOSAL: &str = r#"generated_at: "2026-02-01T00:00:00.000Z"
source_cases:
  - 2026-02-01_partner-event
modified_red_flags:
  - code: PRICE_DISCOUNT_EVENT
    added_keywords: ["원데이 이벤트"]
    reason: 케이스에서 금지된 표현
new_guardrails:
  - condition: case_derived_modification
    text: 비급여 진료비 가격을 함께 고지하세요.
"#;

#[test]
fn test_rubric_show_lists_flags() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["rubric", "show"]);
    assert!(run.success, "show failed: {}", run.stderr);
    assert_contains(&run.stdout, "version: 2.0");
    assert_contains(&run.stdout, "PII_COLLECTION");
    assert_contains(&run.stdout, "threshold=0.7");
}

#[test]
fn test_apply_is_dry_run_without_yes() {
    init_test_logging();
    crate::test_log!("TEST START: test_apply_is_dry_run_without_yes");
    let env = TestEnv::new();
    fs::write(&env.proposal, PROPOSAL).unwrap();
    let before = fs::read_to_string(&env.rubric).unwrap();

    let run = env.run(&["rubric", "apply"]);
    assert!(run.success, "apply failed: {}", run.stderr);
    assert_contains(&run.stdout, "Dry run");
    assert_contains(&run.stdout, "2.0 -> 2.1");
    assert_eq!(fs::read_to_string(&env.rubric).unwrap(), before);

    let quick = env.run(&["quick", "원데이 이벤트 배너"]);
    assert_contains(&quick.stdout, "flags=none");

    let run = env.run(&["rubric", "apply", "--yes"]);
    assert!(run.success, "apply --yes failed: {}", run.stderr);
    assert_contains(&run.stdout, "Rubric updated 2.0 -> 2.1");

    let quick = env.run(&["quick", "원데이 이벤트 배너"]);
    assert!(quick.success);
    assert_contains(&quick.stdout, "flags=PRICE_DISCOUNT_EVENT");
    crate::test_log!("TEST PASS: test_apply_is_dry_run_without_yes");
}

#[test]
fn test_apply_without_proposal_fails() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["rubric", "apply"]);
    assert!(!run.success);
    assert_contains(&run.stderr, "LTR-E300");
}
