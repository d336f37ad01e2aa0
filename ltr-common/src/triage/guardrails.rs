//! Guardrail selection.
//!
//! Conditions are a closed enumeration. A rubric guardrail naming any other
//! condition is accepted at load time but never applies.

use crate::rubric::Guardrail;
use crate::types::{DataUsage, DetectedRedFlag, RevenueModel, TriageInput};
use std::fmt;
use std::str::FromStr;

const MARKETING_TERMS: &[&str] = &["마케팅", "광고", "marketing"];
const USER_CONTENT_TERMS: &[&str] = &["ugc", "사용자 생성", "댓글", "리뷰"];
const TERMS_UPDATE_TERMS: &[&str] = &["약관", "정책 변경", "terms"];

const PII_COLLECTION: &str = "PII_COLLECTION";
const MARKETING_FLAGS: &[&str] = &["EXAGGERATED_AD", "CELEBRITY_ENDORSEMENT"];
const USER_CONTENT_LIABILITY: &str = "USER_CONTENT_LIABILITY";
const PAYMENT_HANDLING: &str = "PAYMENT_HANDLING";

/// Symbolic guardrail condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardrailCondition {
    DataCollection,
    Marketing,
    UserContent,
    TermsUpdate,
    Refund,
}

impl GuardrailCondition {
    pub const ALL: [GuardrailCondition; 5] = [
        Self::DataCollection,
        Self::Marketing,
        Self::UserContent,
        Self::TermsUpdate,
        Self::Refund,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataCollection => "data_collection",
            Self::Marketing => "marketing",
            Self::UserContent => "user_content",
            Self::TermsUpdate => "terms_update",
            Self::Refund => "refund",
        }
    }

    /// Evaluates the condition. `lowered` is the lowercased description.
    #[must_use]
    pub fn holds(&self, input: &TriageInput, flags: &[DetectedRedFlag], lowered: &str) -> bool {
        let flagged = |code: &str| flags.iter().any(|f| f.code == code);
        let mentions = |terms: &[&str]| terms.iter().any(|t| lowered.contains(t));

        match self {
            Self::DataCollection => {
                matches!(
                    input.data_usage,
                    Some(DataUsage::Collects | DataUsage::Unclear)
                ) || flagged(PII_COLLECTION)
            }
            Self::Marketing => {
                mentions(MARKETING_TERMS) || MARKETING_FLAGS.iter().any(|c| flagged(c))
            }
            Self::UserContent => mentions(USER_CONTENT_TERMS) || flagged(USER_CONTENT_LIABILITY),
            Self::TermsUpdate => mentions(TERMS_UPDATE_TERMS),
            Self::Refund => {
                matches!(
                    input.revenue_model,
                    Some(RevenueModel::PaidOnce | RevenueModel::Subscription)
                ) || flagged(PAYMENT_HANDLING)
            }
        }
    }
}

impl fmt::Display for GuardrailCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuardrailCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown guardrail condition '{s}'"))
    }
}

/// Texts of the guardrails whose condition holds, in rubric order.
pub fn select_guardrails(
    guardrails: &[Guardrail],
    input: &TriageInput,
    flags: &[DetectedRedFlag],
    lowered: &str,
) -> Vec<String> {
    guardrails
        .iter()
        .filter(|g| {
            g.condition
                .parse::<GuardrailCondition>()
                .is_ok_and(|c| c.holds(input, flags, lowered))
        })
        .map(|g| g.text.clone())
        .collect()
}
