//! Routing decision: a conservative precedence cascade.
//!
//! The cascade is an ordered table of rules. The first rule whose predicate
//! holds produces the route and confidence. The last rule always applies.
//!
//! | # | Rule                    | Applies when                                   | Outcome |
//! |---|-------------------------|------------------------------------------------|---------|
//! | 1 | `critical_flag`         | any critical flag                              | ESCALATE, 0.95 |
//! | 2 | `high_flag`             | any high flag                                  | ESCALATE, 0.85 |
//! | 3 | `missing_information`   | 2+ missing questions                           | policy `missing_info_action`, 0.60 |
//! | 4 | `external_medium_flag`  | media/customer-facing and a medium flag        | ESCALATE, 0.75 |
//! | 5 | `medium_flag`           | a medium flag, fewer than 2 missing            | 0.65 against threshold |
//! | 6 | `no_risk_signals`       | no flags, nothing missing                      | PROCEED, 0.90 |
//! | 7 | `missing_info_only`     | no flags, something missing                    | `1 - 0.15 * missing` against threshold |
//! | 8 | `low_severity_fallback` | otherwise (only low flags)                     | policy `default`, 0.50 |

use crate::rubric::RoutingPolicy;
use crate::types::{
    DetectedRedFlag, ExternalCommunication, NextStep, Route, RoutingRule, Severity, TriageInput,
};

pub const CRITICAL_CONFIDENCE: f64 = 0.95;
pub const HIGH_CONFIDENCE: f64 = 0.85;
pub const MISSING_INFO_CONFIDENCE: f64 = 0.60;
pub const EXTERNAL_MEDIUM_CONFIDENCE: f64 = 0.75;
pub const MEDIUM_CONFIDENCE: f64 = 0.65;
pub const NO_RISK_CONFIDENCE: f64 = 0.90;
pub const FALLBACK_CONFIDENCE: f64 = 0.50;
/// Confidence lost per missing question when no flag is present.
pub const MISSING_QUESTION_PENALTY: f64 = 0.15;
/// A missing-question count at or above this routes by `missing_info_action`.
pub const MISSING_INFO_LIMIT: usize = 2;
/// PROCEED results below this confidence still go to legal review.
pub const REVIEW_CONFIDENCE_FLOOR: f64 = 0.80;

/// Detected flag counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityTally {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityTally {
    pub fn from_flags(flags: &[DetectedRedFlag]) -> Self {
        flags.iter().fold(Self::default(), |mut tally, flag| {
            match flag.severity {
                Severity::Critical => tally.critical += 1,
                Severity::High => tally.high += 1,
                Severity::Medium => tally.medium += 1,
                Severity::Low => tally.low += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Everything the cascade looks at.
#[derive(Debug, Clone, Copy)]
pub struct RoutingContext<'a> {
    pub tally: SeverityTally,
    pub missing_count: usize,
    pub input: &'a TriageInput,
    pub policy: &'a RoutingPolicy,
}

impl<'a> RoutingContext<'a> {
    pub fn new(
        flags: &[DetectedRedFlag],
        missing_count: usize,
        input: &'a TriageInput,
        policy: &'a RoutingPolicy,
    ) -> Self {
        Self {
            tally: SeverityTally::from_flags(flags),
            missing_count,
            input,
            policy,
        }
    }

    fn externally_visible(&self) -> bool {
        matches!(
            self.input.external_communication,
            Some(ExternalCommunication::Media | ExternalCommunication::CustomerFacing)
        )
    }

    fn against_threshold(&self, confidence: f64) -> Route {
        if confidence < self.policy.confidence_threshold {
            Route::Escalate
        } else {
            Route::Proceed
        }
    }
}

/// One cascade entry.
#[derive(Clone, Copy)]
pub struct CascadeRule {
    pub id: RoutingRule,
    pub applies: fn(&RoutingContext<'_>) -> bool,
    pub outcome: fn(&RoutingContext<'_>) -> (Route, f64),
}

impl std::fmt::Debug for CascadeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeRule").field("id", &self.id).finish()
    }
}

/// The cascade, in precedence order.
pub static ROUTING_CASCADE: [CascadeRule; 8] = [
    CascadeRule {
        id: RoutingRule::CriticalFlag,
        applies: |ctx| ctx.tally.critical > 0,
        outcome: |_| (Route::Escalate, CRITICAL_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::HighFlag,
        applies: |ctx| ctx.tally.high > 0,
        outcome: |_| (Route::Escalate, HIGH_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::MissingInformation,
        applies: |ctx| ctx.missing_count >= MISSING_INFO_LIMIT,
        outcome: |ctx| (ctx.policy.missing_info_action, MISSING_INFO_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::ExternalMediumFlag,
        applies: |ctx| ctx.externally_visible() && ctx.tally.medium > 0,
        outcome: |_| (Route::Escalate, EXTERNAL_MEDIUM_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::MediumFlag,
        applies: |ctx| ctx.tally.medium > 0 && ctx.missing_count < MISSING_INFO_LIMIT,
        outcome: |ctx| (ctx.against_threshold(MEDIUM_CONFIDENCE), MEDIUM_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::NoRiskSignals,
        applies: |ctx| ctx.tally.total() == 0 && ctx.missing_count == 0,
        outcome: |_| (Route::Proceed, NO_RISK_CONFIDENCE),
    },
    CascadeRule {
        id: RoutingRule::MissingInfoOnly,
        applies: |ctx| ctx.tally.total() == 0 && ctx.missing_count > 0,
        outcome: |ctx| {
            // Not clamped: large counts go negative.
            let confidence = 1.0 - MISSING_QUESTION_PENALTY * ctx.missing_count as f64;
            (ctx.against_threshold(confidence), confidence)
        },
    },
    CascadeRule {
        id: RoutingRule::LowSeverityFallback,
        applies: |_| true,
        outcome: |ctx| (ctx.policy.default, FALLBACK_CONFIDENCE),
    },
];

/// Result of running the cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingDecision {
    pub route: Route,
    pub confidence: f64,
    pub rule: RoutingRule,
}

/// Runs the cascade; the first applicable rule wins.
pub fn decide(ctx: &RoutingContext<'_>) -> RoutingDecision {
    let rule = ROUTING_CASCADE
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .unwrap_or(&ROUTING_CASCADE[ROUTING_CASCADE.len() - 1]);
    let (route, confidence) = (rule.outcome)(ctx);
    RoutingDecision {
        route,
        confidence,
        rule: rule.id,
    }
}

/// Escalations and low-confidence PROCEEDs go to legal review.
pub fn recommend_next_step(route: Route, confidence: f64) -> NextStep {
    match route {
        Route::Escalate => NextStep::LegalReview,
        Route::Proceed if confidence < REVIEW_CONFIDENCE_FLOOR => NextStep::LegalReview,
        Route::Proceed => NextStep::ProceedWithGuardrails,
    }
}
