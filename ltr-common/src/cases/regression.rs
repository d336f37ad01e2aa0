//! Regression fixtures built from decided cases.
//!
//! Every indexed case with a recorded decision becomes a fixture: its summary
//! (plus up to three prohibited expressions) is the description, and the
//! decision and rule codes are the expected result. Replaying the fixtures
//! after a rubric change shows which past reviews the new rubric would no
//! longer reproduce.

use super::ingest::parse_case;
use super::{CaseCorpus, CaseError, CaseMetadata};
use crate::triage::TriageEngine;
use crate::types::{Route, TriageInput};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Prohibited expressions appended to a fixture description.
pub const FIXTURE_KEYWORD_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFixture {
    pub case_id: String,
    pub title: String,
    pub description: String,
    pub expected_route: Route,
    #[serde(default)]
    pub expected_rule_codes: Vec<String>,
}

impl RegressionFixture {
    /// Builds a fixture; cases without a decision have none.
    pub fn from_case(case: &CaseMetadata) -> Option<Self> {
        let expected_route = case.decision?;

        let mut description = case.summary.replace('\n', " ").trim().to_string();
        if !case.prohibited_expressions.is_empty() {
            let keywords = case
                .prohibited_expressions
                .iter()
                .take(FIXTURE_KEYWORD_LIMIT)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            description.push_str(&format!(" (키워드: {keywords})"));
        }

        Some(Self {
            case_id: case.case_id.clone(),
            title: case.title.clone(),
            description,
            expected_route,
            expected_rule_codes: case.rule_codes.clone(),
        })
    }
}

/// Contents of the fixtures JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSuite {
    pub generated_at: String,
    pub fixtures: Vec<RegressionFixture>,
}

impl RegressionSuite {
    pub fn new(fixtures: Vec<RegressionFixture>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            fixtures,
        }
    }

    pub fn to_json(&self) -> Result<String, CaseError> {
        serde_json::to_string_pretty(self).map_err(|e| CaseError::Serialize(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), CaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CaseError::io(parent))?;
        }
        let mut json = self.to_json()?;
        json.push('\n');
        fs::write(path, json).map_err(CaseError::io(path))?;
        info!(path = %path.display(), fixtures = self.fixtures.len(), "Saved regression fixtures");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CaseError> {
        let content = fs::read_to_string(path).map_err(CaseError::io(path))?;
        serde_json::from_str(&content).map_err(|source| CaseError::Fixtures {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result of replaying one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionOutcome {
    pub case_id: String,
    pub title: String,
    pub expected_route: Route,
    pub actual_route: Route,
    pub confidence: f64,
    /// Expected codes the engine did not report.
    pub missing_codes: Vec<String>,
}

impl RegressionOutcome {
    pub fn passed(&self) -> bool {
        self.expected_route == self.actual_route && self.missing_codes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub outcomes: Vec<RegressionOutcome>,
}

impl RegressionReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Turns a failing report into an error for the CLI exit status.
    pub fn into_result(self) -> Result<Self, CaseError> {
        if self.all_passed() {
            Ok(self)
        } else {
            Err(CaseError::RegressionFailed {
                failed: self.failed(),
                total: self.total(),
            })
        }
    }
}

/// Replays fixtures through the engine.
pub fn run_regression(engine: &TriageEngine, fixtures: &[RegressionFixture]) -> RegressionReport {
    let outcomes = fixtures
        .iter()
        .map(|fixture| {
            let output = engine.triage(&TriageInput::new(fixture.description.as_str()));
            let missing_codes = fixture
                .expected_rule_codes
                .iter()
                .filter(|code| !output.flag_codes().any(|c| c == code.as_str()))
                .cloned()
                .collect();
            let outcome = RegressionOutcome {
                case_id: fixture.case_id.clone(),
                title: fixture.title.clone(),
                expected_route: fixture.expected_route,
                actual_route: output.routing,
                confidence: output.confidence,
                missing_codes,
            };
            debug!(case_id = %outcome.case_id, passed = outcome.passed(), "Replayed fixture");
            outcome
        })
        .collect();
    RegressionReport { outcomes }
}

impl CaseCorpus {
    /// Fixtures for every indexed case with a decision, in index order.
    pub fn generate_fixtures(&self) -> Result<Vec<RegressionFixture>, CaseError> {
        let mut fixtures = Vec::new();
        for entry in self.load_index()? {
            match parse_case(&self.case_dir(&entry)) {
                Ok(case) => fixtures.extend(RegressionFixture::from_case(&case)),
                Err(e) => warn!(case_id = %entry.case_id, error = %e, "Skipping indexed case"),
            }
        }
        Ok(fixtures)
    }
}
