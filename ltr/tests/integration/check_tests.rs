use std::fs;

use crate::common::{TestEnv, assert_contains, assert_path_exists, init_test_logging};

const MEDICAL_AD: &str = "코성형 전후사진을 보여드립니다. 지금 예약하면 30% 할인!";

#[test]
fn test_check_json_escalates_medical_ad() {
    init_test_logging();
    crate::test_log!("TEST START: test_check_json_escalates_medical_ad");

    let env = TestEnv::new();
    let run = env.run(&["check", "-d", MEDICAL_AD, "--json"]);
    assert!(run.success, "check failed: {}", run.stderr);

    let json = run.json();
    assert_eq!(json["routing"], "ESCALATE");
    assert_eq!(json["routing_rule"], "high_flag");
    assert_eq!(json["recommended_next_step"], "LEGAL_REVIEW");
    let codes: Vec<&str> = json["red_flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec!["BEFORE_AFTER_PHOTO", "PRICE_DISCOUNT_EVENT", "PROCEDURE_MENTION"]
    );
    assert_eq!(json["input_hash"].as_str().unwrap().len(), 16);
    assert!(!run.stdout.contains(MEDICAL_AD));

    crate::test_log!("TEST PASS: test_check_json_escalates_medical_ad");
}

#[test]
fn test_check_appends_audit_entry_without_description() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["check", "-d", MEDICAL_AD, "--json"]);
    assert!(run.success, "check failed: {}", run.stderr);

    assert_path_exists(&env.audit_log);
    let log = fs::read_to_string(&env.audit_log).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(!log.contains(MEDICAL_AD));
    assert_contains(&log, "BEFORE_AFTER_PHOTO");
}

#[test]
fn test_no_log_skips_audit() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["check", "-d", MEDICAL_AD, "--json", "--no-log"]);
    assert!(run.success, "check failed: {}", run.stderr);
    assert!(!env.audit_log.exists());
}

#[test]
fn test_check_report_for_answered_request() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&[
        "check",
        "-d",
        "팀 내부에서 사용하는 일정 관리 도구입니다.",
        "-e",
        "internal_test",
        "-u",
        "no_collection",
        "-r",
        "free",
        "-c",
        "internal",
        "-b",
        "domestic_only",
    ]);
    assert!(run.success, "check failed: {}", run.stderr);
    assert_contains(&run.stdout, "LEGAL TRIAGE RESULT");
    assert_contains(&run.stdout, "PROCEED");
    assert_contains(&run.stdout, "PROCEED_WITH_GUARDRAILS");
    assert_contains(&run.stdout, "--- JSON Output ---");
    assert!(!run.stdout.contains("\u{1b}["), "expected plain output");
}

#[test]
fn test_quick_prints_one_line() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["quick", "사용자의 주민등록번호를 수집합니다"]);
    assert!(run.success, "quick failed: {}", run.stderr);
    assert_eq!(
        run.stdout.trim(),
        "[ESCALATE] confidence=0.95 flags=PII_COLLECTION next=LEGAL_REVIEW"
    );
    assert!(!env.audit_log.exists(), "quick must not write the audit log");
}

#[test]
fn test_quick_without_flags() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["quick", "새로운 기능을 추가합니다."]);
    assert!(run.success, "quick failed: {}", run.stderr);
    assert_eq!(
        run.stdout.trim(),
        "[ESCALATE] confidence=0.60 flags=none next=LEGAL_REVIEW"
    );
}

#[test]
fn test_stats_counts_audited_checks() {
    init_test_logging();
    let env = TestEnv::new();

    assert!(env.run(&["check", "-d", MEDICAL_AD, "--json"]).success);
    assert!(
        env.run(&[
            "check",
            "-d",
            "회원 대상 일정 공유 기능",
            "-e",
            "members_only",
            "-u",
            "no_collection",
            "-r",
            "free",
            "-c",
            "internal",
            "-b",
            "domestic_only",
            "--json",
        ])
        .success
    );

    let run = env.run(&["stats", "--json"]);
    assert!(run.success, "stats failed: {}", run.stderr);
    let json = run.json();
    assert_eq!(json["total"], 2);
    assert_eq!(json["escalate"], 1);
    assert_eq!(json["proceed"], 1);
    assert_eq!(json["top_flags"][0]["code"], "BEFORE_AFTER_PHOTO");

    let run = env.run(&["stats"]);
    assert!(run.success);
    assert_contains(&run.stdout, "Total triages: 2");
}

#[test]
fn test_unknown_categorical_value_is_rejected() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["check", "-d", "x", "--exposure", "everyone"]);
    assert!(!run.success);
    assert_contains(&run.stderr, "everyone");
}

#[test]
fn test_missing_rubric_reports_catalog_code() {
    init_test_logging();
    let env = TestEnv::new();

    let missing = env.dir.path().join("absent.yaml");
    let run = env.run(&["quick", "x", "--rubric", missing.to_str().unwrap()]);
    assert!(!run.success);
    assert_contains(&run.stderr, "LTR-E001");
    assert_contains(&run.stderr, "absent.yaml");
}

#[test]
fn test_interactive_needs_a_terminal() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["check"]);
    assert!(!run.success);
    assert_contains(&run.stderr, "terminal");
}

#[test]
fn test_schema_prints_json_schema() {
    init_test_logging();
    let env = TestEnv::new();

    let run = env.run(&["schema", "output"]);
    assert!(run.success, "schema failed: {}", run.stderr);
    let json = run.json();
    assert!(json["properties"]["routing"].is_object());
    assert!(json["properties"]["input_hash"].is_object());
}
