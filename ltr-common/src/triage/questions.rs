//! Missing-information analysis.

use super::detector::KeywordMatcher;
use crate::rubric::QuestionTemplate;
use crate::types::{InputField, TriageInput};

/// Produces clarifying questions from the rubric's question templates.
#[derive(Debug, Clone)]
pub struct QuestionAnalyzer {
    contains: Vec<KeywordMatcher>,
    fields: Vec<Option<InputField>>,
}

impl QuestionAnalyzer {
    pub fn new(templates: &[QuestionTemplate]) -> Self {
        Self {
            contains: templates
                .iter()
                .map(|t| KeywordMatcher::new(&t.trigger_if_contains))
                .collect(),
            fields: templates
                .iter()
                .map(|t| InputField::from_category(&t.category))
                .collect(),
        }
    }

    /// Questions whose template fired, in rubric order, each at most once.
    ///
    /// A template fires when it is `trigger_if_unknown` and its mapped field is
    /// absent, or when any `trigger_if_contains` keyword appears in the text.
    pub fn missing_questions(
        &self,
        templates: &[QuestionTemplate],
        input: &TriageInput,
        lowered: &str,
    ) -> Vec<String> {
        templates
            .iter()
            .zip(self.contains.iter().zip(&self.fields))
            .filter(|(template, (contains, field))| {
                let unknown = template.trigger_if_unknown
                    && field.is_some_and(|f| !input.is_known(f));
                unknown || contains.any_match(lowered)
            })
            .map(|(template, _)| template.question.clone())
            .collect()
    }
}
