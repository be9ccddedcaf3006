//! Phase 2: pull the inferred fields out of the SDS text

use crate::ai_client::TextGenerator;
use crate::fields::{parse_field_map, FieldMap};

use super::Result;

pub fn extraction_prompt(fields: &[String], pdf_text: &str) -> String {
    let fields_list = fields
        .iter()
        .map(|f| format!("- {}", f))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert data extraction system for Safety Data Sheets (SDS).
Analyze the raw SDS text below. Your task is to find the information for the following fields.
Return the data ONLY in a valid JSON format where the keys exactly match the field names provided.

FIELDS TO EXTRACT:
{}

RAW SDS TEXT:
---
{}
---"#,
        fields_list, pdf_text
    )
}

/// Ask the service for the value of each field. Fields it cannot find are
/// simply absent from the result.
pub fn try_extract_field_values(
    generator: &dyn TextGenerator,
    fields: &[String],
    pdf_text: &str,
) -> Result<FieldMap> {
    let reply = generator.generate(&extraction_prompt(fields, pdf_text))?;
    let map = parse_field_map(&reply)?;

    let missing = fields.iter().filter(|f| !map.contains_key(f.as_str())).count();
    if missing > 0 {
        tracing::debug!(missing, requested = fields.len(), "some fields were not returned");
    }
    Ok(map)
}

/// Like [`try_extract_field_values`], but reports failures and yields an empty map
pub fn extract_field_values(generator: &dyn TextGenerator, fields: &[String], pdf_text: &str) -> FieldMap {
    tracing::info!("Phase 2: Extracting real data from PDF based on inferred structure...");
    match try_extract_field_values(generator, fields, pdf_text) {
        Ok(map) => {
            tracing::info!(fields = map.len(), "Extraction complete");
            map
        }
        Err(e) => {
            tracing::error!("Error during data extraction: {}", e);
            FieldMap::new()
        }
    }
}
