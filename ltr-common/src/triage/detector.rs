//! Keyword-based red-flag detection.
//!
//! Keywords are lowercased and compiled into `memchr` substring finders once,
//! when the engine is built. Matching is plain substring containment against
//! the lowercased description: no tokenization, no overlap resolution, and
//! partial-word hits count.

use crate::rubric::RedFlag;
use crate::types::DetectedRedFlag;
use memchr::memmem;

/// Precompiled substring finders for one keyword list.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    finders: Vec<memmem::Finder<'static>>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let finders = keywords
            .iter()
            .map(|k| memmem::Finder::new(k.as_ref().to_lowercase().as_bytes()).into_owned())
            .collect();
        Self { finders }
    }

    /// Indices of keywords found in `lowered`, in keyword order.
    pub fn matching_indices<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.finders
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.find(lowered.as_bytes()).is_some())
            .map(|(i, _)| i)
    }

    /// Whether any keyword is found in `lowered`.
    pub fn any_match(&self, lowered: &str) -> bool {
        self.finders
            .iter()
            .any(|f| f.find(lowered.as_bytes()).is_some())
    }

    pub fn len(&self) -> usize {
        self.finders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }
}

/// Detector for the rubric's red flags.
#[derive(Debug, Clone)]
pub struct RedFlagDetector {
    matchers: Vec<KeywordMatcher>,
}

impl RedFlagDetector {
    pub fn new(flags: &[RedFlag]) -> Self {
        Self {
            matchers: flags.iter().map(|f| KeywordMatcher::new(&f.keywords)).collect(),
        }
    }

    /// Every flag with at least one matching keyword, in rubric order.
    ///
    /// `flags` must be the slice the detector was built from.
    pub fn detect(&self, flags: &[RedFlag], lowered: &str) -> Vec<DetectedRedFlag> {
        flags
            .iter()
            .zip(&self.matchers)
            .filter_map(|(flag, matcher)| {
                let matched: Vec<String> = matcher
                    .matching_indices(lowered)
                    .map(|i| flag.keywords[i].clone())
                    .collect();
                (!matched.is_empty()).then(|| DetectedRedFlag {
                    code: flag.code.clone(),
                    reason: flag.reason.clone(),
                    matched_keywords: matched,
                    severity: flag.severity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn flag(code: &str, keywords: &[&str], severity: Severity) -> RedFlag {
        RedFlag {
            code: code.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            reason: format!("{code} reason"),
            severity,
        }
    }

    fn detect(flags: &[RedFlag], text: &str) -> Vec<DetectedRedFlag> {
        RedFlagDetector::new(flags).detect(flags, &text.to_lowercase())
    }

    #[test]
    fn test_matches_case_insensitively_and_keeps_rubric_spelling() {
        let flags = vec![flag("BIO", &["Biometric", "FaceID"], Severity::Critical)];
        let found = detect(&flags, "We store BIOMETRIC templates and faceid hashes");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].matched_keywords, vec!["Biometric", "FaceID"]);
        assert_eq!(found[0].severity, Severity::Critical);
    }

    #[test]
    fn test_partial_word_matches_count() {
        let flags = vec![flag("AD", &["ad"], Severity::Low)];
        assert_eq!(detect(&flags, "a new badge").len(), 1);
    }

    #[test]
    fn test_results_follow_rubric_order_not_text_order() {
        let flags = vec![
            flag("FIRST", &["필러"], Severity::Medium),
            flag("SECOND", &["할인"], Severity::High),
        ];
        let found = detect(&flags, "할인 이벤트와 필러 시술");
        let codes: Vec<_> = found.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["FIRST", "SECOND"]);
    }

    #[test]
    fn test_keywords_keep_rubric_order() {
        let flags = vec![flag("P", &["평생", "영구적"], Severity::High)];
        let found = detect(&flags, "영구적이고 평생 가는 효과");
        assert_eq!(found[0].matched_keywords, vec!["평생", "영구적"]);
    }

    #[test]
    fn test_no_match_yields_nothing() {
        let flags = vec![flag("PII", &["주민등록번호"], Severity::Critical)];
        assert!(detect(&flags, "사내 공지 게시판 개선").is_empty());
    }

    #[test]
    fn test_keyword_matcher_any_match() {
        let matcher = KeywordMatcher::new(&["Terms", "약관"]);
        assert_eq!(matcher.len(), 2);
        assert!(matcher.any_match("updated terms of service"));
        assert!(!matcher.any_match("release notes"));
        assert!(KeywordMatcher::new::<&str>(&[]).is_empty());
    }
}
