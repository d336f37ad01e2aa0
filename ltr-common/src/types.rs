//! Request and result types shared by the engine, the audit log and the CLI.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Routes, severities, next steps
// ============================================================================

/// Risk route for a submission.
///
/// Serialized as `ESCALATE` / `PROCEED`. The legacy spellings `TYPE_1` and
/// `TYPE_2` are accepted when reading rubrics and audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Route {
    /// Requires legal review.
    #[serde(rename = "ESCALATE", alias = "TYPE_1")]
    Escalate,
    /// May proceed under guardrails.
    #[serde(rename = "PROCEED", alias = "TYPE_2")]
    Proceed,
}

impl Route {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Escalate => "ESCALATE",
            Self::Proceed => "PROCEED",
        }
    }

    /// Korean label used in human-readable reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Escalate => "법무 검토 필요",
            Self::Proceed => "가이드라인 준수 시 진행 가능",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ESCALATE" | "TYPE_1" => Ok(Self::Escalate),
            "PROCEED" | "TYPE_2" => Ok(Self::Proceed),
            _ => Err(ParseValueError::new("route", s, &["ESCALATE", "PROCEED"])),
        }
    }
}

/// Declared severity of a red flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseValueError::new(
                "severity",
                s,
                &["critical", "high", "medium", "low"],
            )),
        }
    }
}

/// Recommended follow-up for a triage result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextStep {
    LegalReview,
    ProceedWithGuardrails,
}

impl NextStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LegalReview => "LEGAL_REVIEW",
            Self::ProceedWithGuardrails => "PROCEED_WITH_GUARDRAILS",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LegalReview => "법무팀 검토 요청",
            Self::ProceedWithGuardrails => "가이드라인 준수하여 진행",
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the routing rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoutingRule {
    CriticalFlag,
    HighFlag,
    MissingInformation,
    ExternalMediumFlag,
    MediumFlag,
    NoRiskSignals,
    MissingInfoOnly,
    LowSeverityFallback,
}

impl RoutingRule {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CriticalFlag => "critical_flag",
            Self::HighFlag => "high_flag",
            Self::MissingInformation => "missing_information",
            Self::ExternalMediumFlag => "external_medium_flag",
            Self::MediumFlag => "medium_flag",
            Self::NoRiskSignals => "no_risk_signals",
            Self::MissingInfoOnly => "missing_info_only",
            Self::LowSeverityFallback => "low_severity_fallback",
        }
    }
}

impl fmt::Display for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorical value string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}' (expected one of: {})", expected.join(", "))]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

impl ParseValueError {
    fn new(kind: &'static str, value: &str, expected: &[&'static str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.to_vec(),
        }
    }
}

// ============================================================================
// Structured input fields
// ============================================================================

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(ParseValueError::new($kind, s, &[$($text),+])),
                }
            }
        }
    };
}

categorical! {
    /// Who will see the feature or campaign.
    Exposure, "exposure" {
        Public => "public",
        MembersOnly => "members_only",
        SpecificGroup => "specific_group",
        InternalTest => "internal_test",
    }
}

categorical! {
    /// Whether personal data is collected.
    DataUsage, "data_usage" {
        Collects => "collects",
        NoCollection => "no_collection",
        Unclear => "unclear",
    }
}

categorical! {
    /// How the offering makes money.
    RevenueModel, "revenue_model" {
        Free => "free",
        PaidOnce => "paid_once",
        Subscription => "subscription",
        Ads => "ads",
        Commission => "commission",
    }
}

categorical! {
    /// Audience of outward communication.
    ExternalCommunication, "external_communication" {
        CustomerFacing => "customer_facing",
        Media => "media",
        Internal => "internal",
    }
}

categorical! {
    /// Whether data or service crosses borders.
    CrossBorder, "cross_border" {
        DomesticOnly => "domestic_only",
        IncludesOverseas => "includes_overseas",
        Unclear => "unclear",
    }
}

/// The structured fields a question template can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Exposure,
    DataUsage,
    RevenueModel,
    ExternalCommunication,
    CrossBorder,
}

impl InputField {
    /// Maps a question-template category to its structured field.
    ///
    /// Categories outside the table have no field and never count as missing.
    #[must_use]
    pub fn from_category(category: &str) -> Option<Self> {
        match category {
            "exposure" => Some(Self::Exposure),
            "data_usage" => Some(Self::DataUsage),
            "revenue_model" => Some(Self::RevenueModel),
            "external_communication" => Some(Self::ExternalCommunication),
            "cross_border" => Some(Self::CrossBorder),
            _ => None,
        }
    }
}

// ============================================================================
// Request and result
// ============================================================================

/// One triage request. Absent categorical fields mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriageInput {
    /// Free-text description of the product idea, feature or campaign.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_usage: Option<DataUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<RevenueModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_communication: Option<ExternalCommunication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_border: Option<CrossBorder>,
}

impl TriageInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_exposure(mut self, value: Exposure) -> Self {
        self.exposure = Some(value);
        self
    }

    #[must_use]
    pub fn with_data_usage(mut self, value: DataUsage) -> Self {
        self.data_usage = Some(value);
        self
    }

    #[must_use]
    pub fn with_revenue_model(mut self, value: RevenueModel) -> Self {
        self.revenue_model = Some(value);
        self
    }

    #[must_use]
    pub fn with_external_communication(mut self, value: ExternalCommunication) -> Self {
        self.external_communication = Some(value);
        self
    }

    #[must_use]
    pub fn with_cross_border(mut self, value: CrossBorder) -> Self {
        self.cross_border = Some(value);
        self
    }

    /// Whether the structured field has a value.
    #[must_use]
    pub fn is_known(&self, field: InputField) -> bool {
        match field {
            InputField::Exposure => self.exposure.is_some(),
            InputField::DataUsage => self.data_usage.is_some(),
            InputField::RevenueModel => self.revenue_model.is_some(),
            InputField::ExternalCommunication => self.external_communication.is_some(),
            InputField::CrossBorder => self.cross_border.is_some(),
        }
    }
}

/// A rubric red flag that matched the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedRedFlag {
    pub code: String,
    pub reason: String,
    /// Matching keywords in rubric spelling and rubric order.
    #[serde(rename = "matchedKeywords")]
    pub matched_keywords: Vec<String>,
    pub severity: Severity,
}

/// Final triage record.
///
/// The description itself is never part of the record; `input_hash` is its
/// only representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TriageOutput {
    pub routing: Route,
    pub confidence: f64,
    pub routing_rule: RoutingRule,
    pub red_flags: Vec<DetectedRedFlag>,
    pub missing_info_questions: Vec<String>,
    pub safe_guardrails: Vec<String>,
    pub recommended_next_step: NextStep,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
    /// First 16 hex characters of the SHA-256 digest of the description.
    pub input_hash: String,
}

impl TriageOutput {
    /// Red flag codes in rubric order.
    pub fn flag_codes(&self) -> impl Iterator<Item = &str> {
        self.red_flags.iter().map(|f| f.code.as_str())
    }
}
