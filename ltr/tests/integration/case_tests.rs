use std::fs;

use crate::common::{TestEnv, assert_contains, assert_path_exists, init_test_logging};

const CASE_NAME: &str = "2026-02-01_partner-event";

const CASE_YAML: &str = r#"case_id: 2026-02-01_partner-event
title: 제휴사 특가 이벤트 배너 검토
date: 2026-02-01
team: 마케팅팀
decision: ESCALATE
rule_codes:
  - PRICE_DISCOUNT_EVENT
summary: 제휴사와 함께 진행하는 선착순 특가 이벤트 배너.
prohibited_expressions:
  - 선착순 특가
required_modifications:
  - 비급여 진료비 가격 고지 문구 추가
"#;

const REQUEST_MD: &str = "# 검토 요청\n요청자: PM_A\n이벤트 배너 문구 검토를 요청드립니다.\n";
const RESPONSE_MD: &str = "# 검토 의견\n검토: 법무_1\n- '선착순 특가'는 사용 불가합니다.\n";

fn env_with_case() -> TestEnv {
    let env = TestEnv::new();
    env.add_case(
        CASE_NAME,
        &[
            ("case.yaml", CASE_YAML),
            ("request.md", REQUEST_MD),
            ("response.md", RESPONSE_MD),
        ],
    );
    env
}

#[test]
fn test_case_pipeline() {
    init_test_logging();
    crate::test_log!("TEST START: test_case_pipeline");
    let env = env_with_case();

    let run = env.run(&["cases", "ingest"]);
    assert!(run.success, "ingest failed: {}", run.stderr);
    assert_contains(&run.stdout, "Indexed 1 case");
    assert_path_exists(&env.cases.join("index.jsonl"));

    let run = env.run(&["cases", "anonymize"]);
    assert!(run.success, "anonymize failed: {}\n{}", run.stdout, run.stderr);
    assert_contains(&run.stdout, "passed the anonymization check");

    let run = env.run(&["cases", "extract"]);
    assert!(run.success, "extract failed: {}", run.stderr);
    assert_path_exists(&env.cases.join(CASE_NAME).join("extracted_rules.yaml"));

    let run = env.run(&["rubric", "propose"]);
    assert!(run.success, "propose failed: {}", run.stderr);
    assert_contains(&run.stdout, "No approved rule candidates");
    assert!(!env.proposal.exists());

    let run = env.run(&["cases", "gen-fixtures", "--preview"]);
    assert!(run.success);
    assert_contains(&run.stdout, CASE_NAME);
    assert!(!env.regression.exists());

    let run = env.run(&["cases", "gen-fixtures"]);
    assert!(run.success, "gen-fixtures failed: {}", run.stderr);
    assert_contains(&run.stdout, "Wrote 1 fixture");
    assert_path_exists(&env.regression);

    let run = env.run(&["cases", "regress"]);
    assert!(run.success, "regress failed: {}\n{}", run.stdout, run.stderr);
    assert_contains(&run.stdout, "Regression: 1/1 passed");

    crate::test_log!("TEST PASS: test_case_pipeline");
}

#[test]
fn test_anonymize_reports_leaks() {
    init_test_logging();
    let env = env_with_case();
    fs::write(
        env.cases.join(CASE_NAME).join("request.md"),
        "# 검토 요청\n연락처: 010-1234-5678\n",
    )
    .unwrap();

    assert!(env.run(&["cases", "ingest"]).success);
    let run = env.run(&["cases", "anonymize"]);
    assert!(!run.success);
    assert_contains(&run.stdout, "[phone] 010-1234-5678");
    assert_contains(&run.stderr, "LTR-E2");
}

#[test]
fn test_anonymize_single_folder() {
    init_test_logging();
    let env = env_with_case();
    let case_dir = env.cases.join(CASE_NAME);

    let run = env.run(&["cases", "anonymize", case_dir.to_str().unwrap()]);
    assert!(run.success, "anonymize failed: {}", run.stderr);
    assert_contains(&run.stdout, CASE_NAME);

    let missing = env.cases.join("2026-09-09_missing");
    let run = env.run(&["cases", "anonymize", missing.to_str().unwrap()]);
    assert!(!run.success);
    assert_contains(&run.stderr, "LTR-E200");
}

#[test]
fn test_regress_fails_when_fixture_no_longer_matches() {
    init_test_logging();
    let env = env_with_case();
    assert!(env.run(&["cases", "ingest"]).success);
    assert!(env.run(&["cases", "gen-fixtures"]).success);

    let suite = fs::read_to_string(&env.regression).unwrap();
    fs::write(&env.regression, suite.replace("\"ESCALATE\"", "\"PROCEED\"")).unwrap();

    let run = env.run(&["cases", "regress"]);
    assert!(!run.success);
    assert_contains(&run.stdout, "Regression: 0/1 passed");
}
