//! Anonymization check for stored case files.
//!
//! Case records must not carry personal data. Each text file of a case is
//! scanned line by line for phone numbers, e-mail addresses, resident
//! registration numbers, labelled names, named clinics, street addresses and
//! image or CDN URLs. Matches that are already anonymized (`병원_A`, `PM_B`,
//! `[REDACTED]`, ...) or that end with a generic specialty term are ignored.

use super::{CASE_FILE, CaseCorpus, CaseError};
use regex::{Regex, RegexSet};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Files checked in every case folder, in report order.
pub const CHECKED_FILES: [&str; 3] = ["request.md", "response.md", CASE_FILE];

/// Kind of personal data a pattern detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Phone,
    Email,
    IdNumber,
    Name,
    Hospital,
    Address,
    ImageRef,
}

impl PiiKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::IdNumber => "id_number",
            Self::Name => "name",
            Self::Hospital => "hospital",
            Self::Address => "address",
            Self::ImageRef => "image_ref",
        }
    }
}

impl fmt::Display for PiiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct PiiPattern {
    kind: PiiKind,
    regex: Regex,
    suggestion: &'static str,
    /// Reject matches directly followed by `_` (`병원_A` style placeholders).
    reject_before_underscore: bool,
}

fn pii(kind: PiiKind, pattern: &str, suggestion: &'static str) -> PiiPattern {
    PiiPattern {
        kind,
        regex: Regex::new(pattern).expect("built-in PII pattern must compile"),
        suggestion,
        reject_before_underscore: false,
    }
}

static PII_PATTERNS: LazyLock<Vec<PiiPattern>> = LazyLock::new(|| {
    vec![
        pii(
            PiiKind::Phone,
            r"01[0-9]-?[0-9]{3,4}-?[0-9]{4}",
            "[전화번호 삭제] 또는 \"010-****-****\"",
        ),
        pii(
            PiiKind::Phone,
            r"02-?[0-9]{3,4}-?[0-9]{4}",
            "[전화번호 삭제] 또는 \"02-***-****\"",
        ),
        pii(
            PiiKind::Email,
            r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
            "[이메일 삭제] 또는 \"***@***.com\"",
        ),
        pii(
            PiiKind::IdNumber,
            r"[0-9]{6}-?[1-4][0-9]{6}",
            "[주민등록번호 삭제] - 절대 저장하지 마세요!",
        ),
        pii(
            PiiKind::Name,
            r"(?:이름|담당|작성자|연락처\s*이름)(?::|：)\s*([가-힣]{2,4})",
            "\"PM_A\", \"법무_1\", \"환자_A\" 등 역할명으로 대체",
        ),
        PiiPattern {
            reject_before_underscore: true,
            ..pii(
                PiiKind::Hospital,
                r"([가-힣]{2,})(성형외과|피부과|의원|클리닉|한의원|병원)",
                "\"병원_A\", \"클리닉_B\" 등으로 익명화",
            )
        },
        pii(
            PiiKind::Address,
            r"(서울|부산|대구|인천|광주|대전|울산|세종|경기|강원|충북|충남|전북|전남|경북|경남|제주)[^\s]{0,10}(구|시|군)[^\s]{0,15}(동|로|길)\s*[0-9]+",
            "[구체적 주소 삭제] - 시/구 수준까지만 표기",
        ),
        pii(
            PiiKind::ImageRef,
            r#"(?i)https?://[^\s<>"]+\.(jpg|jpeg|png|gif|webp|bmp)"#,
            "[이미지 URL 삭제] - \"[이미지: 설명]\"으로 대체",
        ),
        pii(
            PiiKind::ImageRef,
            r#"(?i)https?://[^/\s]*(?:s3|cdn|storage|blob)[^/\s]*/[^\s<>"]+"#,
            "[CDN URL 삭제]",
        ),
    ]
});

static ANONYMIZED: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"병원_[A-Z]",
        r"클리닉_[A-Z]",
        r"PM_[A-Z]",
        r"마케터_[A-Z]",
        r"법무_[0-9]",
        r"환자_[A-Z]",
        r"의사_[A-Z]",
        r"\[REDACTED\]",
        r"\[삭제됨\]",
        r"\[익명화\]",
    ])
    .expect("built-in placeholder patterns must compile")
});

/// Generic specialty names that are not identifying on their own.
pub const ALLOWED_TERMS: [&str; 7] = [
    "성형외과",
    "피부과",
    "정형외과",
    "내과",
    "외과",
    "치과",
    "한의원",
];

/// One suspicious match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizationIssue {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: PiiKind,
    pub matched: String,
    pub suggestion: String,
}

/// Result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub file: PathBuf,
    pub passed: bool,
    pub issues: Vec<AnonymizationIssue>,
}

/// Results for one indexed case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseCheck {
    pub case_id: String,
    pub files: Vec<FileCheck>,
}

impl CaseCheck {
    pub fn passed(&self) -> bool {
        self.files.iter().all(|f| f.passed)
    }
}

fn is_already_anonymized(matched: &str) -> bool {
    ANONYMIZED.is_match(matched)
        || ALLOWED_TERMS
            .iter()
            .any(|term| matched == *term || matched.ends_with(term))
}

/// Scans text and reports every non-anonymized match.
pub fn check_text(content: &str) -> Vec<AnonymizationIssue> {
    let mut issues = Vec::new();
    for (index, line) in content.split('\n').enumerate() {
        for pattern in PII_PATTERNS.iter() {
            for m in pattern.regex.find_iter(line) {
                if pattern.reject_before_underscore && line[m.end()..].starts_with('_') {
                    continue;
                }
                if is_already_anonymized(m.as_str()) {
                    continue;
                }
                issues.push(AnonymizationIssue {
                    line: index + 1,
                    column: line[..m.start()].chars().count() + 1,
                    kind: pattern.kind,
                    matched: m.as_str().to_string(),
                    suggestion: pattern.suggestion.to_string(),
                });
            }
        }
    }
    issues
}

/// Checks one file.
pub fn check_file(path: &Path) -> Result<FileCheck, CaseError> {
    let content = fs::read_to_string(path).map_err(CaseError::io(path))?;
    let issues = check_text(&content);
    debug!(file = %path.display(), issues = issues.len(), "Checked file");
    Ok(FileCheck {
        file: path.to_path_buf(),
        passed: issues.is_empty(),
        issues,
    })
}

/// Checks whichever of the case text files exist in a folder.
pub fn check_case(case_dir: &Path) -> Result<Vec<FileCheck>, CaseError> {
    CHECKED_FILES
        .iter()
        .map(|name| case_dir.join(name))
        .filter(|path| path.is_file())
        .map(|path| check_file(&path))
        .collect()
}

impl CaseCorpus {
    /// Checks every indexed case.
    pub fn check_all(&self) -> Result<Vec<CaseCheck>, CaseError> {
        self.load_index()?
            .iter()
            .map(|entry| {
                Ok(CaseCheck {
                    case_id: entry.case_id.clone(),
                    files: check_case(&self.case_dir(entry))?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::fixtures::{BOTOX_CASE_YAML, write_case};

    fn kinds(text: &str) -> Vec<PiiKind> {
        check_text(text).into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_detects_phone_numbers() {
        assert_eq!(kinds("연락처 010-1234-5678"), vec![PiiKind::Phone]);
        assert_eq!(kinds("대표번호 02-123-4567"), vec![PiiKind::Phone]);
    }

    #[test]
    fn test_detects_email_and_id_number() {
        assert_eq!(kinds("메일 pm@example.com"), vec![PiiKind::Email]);
        assert_eq!(kinds("번호 900101-1234567"), vec![PiiKind::IdNumber]);
    }

    #[test]
    fn test_detects_labelled_name() {
        let issues = check_text("담당: 홍길동");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, PiiKind::Name);
        assert_eq!(issues[0].matched, "담당: 홍길동");
    }

    #[test]
    fn test_detects_named_clinic() {
        let issues = check_text("협업처는 청담미소클리닉 입니다");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, PiiKind::Hospital);
        assert_eq!(issues[0].matched, "청담미소클리닉");
        assert_eq!(issues[0].column, 6);
    }

    #[test]
    fn test_placeholders_and_generic_terms_pass() {
        assert!(check_text("협업 병원_A 및 클리닉_B").is_empty());
        assert!(check_text("담당: PM_A").is_empty());
        assert!(check_text("강남성형외과 시술 광고").is_empty());
        assert!(check_text("연락처 [REDACTED]").is_empty());
    }

    #[test]
    fn test_detects_address_and_urls() {
        assert_eq!(kinds("서울 강남구 테헤란로 123"), Vec::<PiiKind>::new());
        assert_eq!(kinds("서울시강남구역삼동 123"), vec![PiiKind::Address]);
        assert_eq!(
            kinds("https://example.com/a/photo.JPG"),
            vec![PiiKind::ImageRef]
        );
        assert_eq!(
            kinds("https://cdn.example.com/assets/banner"),
            vec![PiiKind::ImageRef]
        );
    }

    #[test]
    fn test_line_and_column_are_one_based() {
        let issues = check_text("첫 줄\n문의 pm@example.com");
        assert_eq!(issues[0].line, 2);
        assert_eq!(issues[0].column, 4);
    }

    #[test]
    fn test_check_case_reads_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let case_dir = write_case(dir.path(), "2026-01-07_sns-campaign-botox", BOTOX_CASE_YAML);
        fs::write(case_dir.join("request.md"), "담당: PM_A\n광고 문구 검토 요청").unwrap();

        let results = check_case(&case_dir).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
        assert!(results[0].file.ends_with("request.md"));
    }

    #[test]
    fn test_check_all_reports_failures_per_case() {
        let dir = tempfile::tempdir().unwrap();
        let case_dir = write_case(dir.path(), "2026-01-07_sns-campaign-botox", BOTOX_CASE_YAML);
        fs::write(case_dir.join("response.md"), "회신: 010-9876-5432 로 연락").unwrap();
        let corpus = CaseCorpus::new(dir.path());
        corpus.save_index(&corpus.ingest().unwrap()).unwrap();

        let checks = corpus.check_all().unwrap();
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].passed());
        let failed: Vec<_> = checks[0].files.iter().filter(|f| !f.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].issues[0].kind, PiiKind::Phone);
    }
}
