//! `ltr schema`: JSON Schemas for machine-readable output.

use anyhow::Result;
use ltr_common::schema::SchemaKind;

pub fn schema(kind: SchemaKind) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&kind.generate())?);
    Ok(())
}
