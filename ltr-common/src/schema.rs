//! JSON Schemas for the machine-readable surfaces.
//!
//! - `output` - a triage result as printed by `ltr check --json`
//! - `audit` - one line of the audit log
//! - `input` - a triage request

use crate::audit::AuditEntry;
use crate::types::{TriageInput, TriageOutput};
use schemars::schema::RootSchema;
use schemars::schema_for;
use std::fmt;
use std::str::FromStr;

/// Schemas that can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Output,
    Audit,
    Input,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [Self::Output, Self::Audit, Self::Input];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Audit => "audit",
            Self::Input => "input",
        }
    }

    #[must_use]
    pub fn generate(&self) -> RootSchema {
        match self {
            Self::Output => generate_output_schema(),
            Self::Audit => generate_audit_schema(),
            Self::Input => generate_input_schema(),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown schema '{s}' (expected output, audit or input)"))
    }
}

#[must_use]
pub fn generate_output_schema() -> RootSchema {
    schema_for!(TriageOutput)
}

#[must_use]
pub fn generate_audit_schema() -> RootSchema {
    schema_for!(AuditEntry)
}

#[must_use]
pub fn generate_input_schema() -> RootSchema {
    schema_for!(TriageInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(schema: &RootSchema) -> Vec<String> {
        schema
            .schema
            .object
            .as_ref()
            .map(|o| o.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_output_schema_lists_result_fields() {
        let props = properties(&generate_output_schema());
        for field in ["routing", "confidence", "red_flags", "input_hash", "timestamp"] {
            assert!(props.contains(&field.to_string()), "missing {field}");
        }
    }

    #[test]
    fn test_audit_schema_has_no_description() {
        let props = properties(&generate_audit_schema());
        assert!(props.contains(&"input_hash".to_string()));
        assert!(!props.contains(&"description".to_string()));
    }

    #[test]
    fn test_input_schema_requires_description() {
        let schema = generate_input_schema();
        let object = schema.schema.object.as_ref().unwrap();
        assert!(object.required.contains("description"));
    }

    #[test]
    fn test_schema_kind_parse() {
        assert_eq!("Audit".parse::<SchemaKind>(), Ok(SchemaKind::Audit));
        assert!("rubric".parse::<SchemaKind>().is_err());
        let json = serde_json::to_string(&SchemaKind::Output.generate()).unwrap();
        assert!(json.contains("TriageOutput"));
    }
}
