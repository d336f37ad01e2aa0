//! Decision engine.
//!
//! Control flow for one request:
//!
//! ```text
//! description ─┬─> RedFlagDetector ───────┬─> select_guardrails
//!              └─> QuestionAnalyzer ──────┤
//!                                         └─> routing::decide ─> next step ─> TriageOutput
//! ```
//!
//! Classification is pure over the input and the loaded rubric. The engine
//! keeps the rubric behind an `Arc` and is `Send + Sync`.

pub mod detector;
pub mod guardrails;
pub mod questions;
pub mod routing;

use crate::rubric::{Rubric, RubricError, load_rubric};
use crate::types::{TriageInput, TriageOutput};
use chrono::{DateTime, SecondsFormat, Utc};
use detector::RedFlagDetector;
use questions::QuestionAnalyzer;
use routing::RoutingContext;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub use guardrails::{GuardrailCondition, select_guardrails};
pub use routing::{ROUTING_CASCADE, RoutingDecision, decide, recommend_next_step};

/// Hex characters kept from the description digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Rubric-driven triage engine.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    rubric: Arc<Rubric>,
    detector: RedFlagDetector,
    questions: QuestionAnalyzer,
}

impl TriageEngine {
    pub fn new(rubric: Rubric) -> Self {
        Self::from_shared(Arc::new(rubric))
    }

    pub fn from_shared(rubric: Arc<Rubric>) -> Self {
        let detector = RedFlagDetector::new(&rubric.red_flags);
        let questions = QuestionAnalyzer::new(&rubric.question_templates);
        Self {
            rubric,
            detector,
            questions,
        }
    }

    /// Loads and validates the rubric at `path`.
    pub fn from_path(path: &Path) -> Result<Self, RubricError> {
        Ok(Self::new(load_rubric(path)?))
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    pub fn shared_rubric(&self) -> Arc<Rubric> {
        Arc::clone(&self.rubric)
    }

    /// Classifies one request, stamped with the current time.
    pub fn triage(&self, input: &TriageInput) -> TriageOutput {
        self.triage_at(input, Utc::now())
    }

    /// Classifies one request with an explicit timestamp.
    pub fn triage_at(&self, input: &TriageInput, at: DateTime<Utc>) -> TriageOutput {
        let rubric = &*self.rubric;
        let lowered = input.description.to_lowercase();

        let red_flags = self.detector.detect(&rubric.red_flags, &lowered);
        let missing_info_questions =
            self.questions
                .missing_questions(&rubric.question_templates, input, &lowered);
        let safe_guardrails =
            select_guardrails(&rubric.safe_guardrails, input, &red_flags, &lowered);

        let ctx = RoutingContext::new(
            &red_flags,
            missing_info_questions.len(),
            input,
            &rubric.routing_policy,
        );
        let decision = decide(&ctx);
        let recommended_next_step = recommend_next_step(decision.route, decision.confidence);
        let input_hash = fingerprint(&input.description);

        debug!(
            route = %decision.route,
            confidence = decision.confidence,
            rule = %decision.rule,
            red_flags = red_flags.len(),
            missing = missing_info_questions.len(),
            guardrails = safe_guardrails.len(),
            input_hash = %input_hash,
            "Triage decision"
        );

        TriageOutput {
            routing: decision.route,
            confidence: decision.confidence,
            routing_rule: decision.rule,
            red_flags,
            missing_info_questions,
            safe_guardrails,
            recommended_next_step,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            input_hash,
        }
    }
}

/// First 16 hex characters of the SHA-256 digest of `description`.
pub fn fingerprint(description: &str) -> String {
    let digest = Sha256::digest(description.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}
