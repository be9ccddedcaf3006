//! Phase 1: infer the variable fields of the model document

use crate::ai_client::TextGenerator;
use crate::fields::{parse_field_map, FieldMap};

use super::Result;

/// Field whose example value is requested as a multi-line string
pub const MULTILINE_FIELD: &str = "nfpa_diamond";

pub fn schema_prompt(template_text: &str) -> String {
    format!(
        r#"You are a template analysis expert. Analyze the following text from a model document.
Your task is to identify all the pieces of information that are specific to the example and would change in a different report.
For each piece of variable data, create a logical, snake_case key name (e.g., 'product_name', 'nfpa_health_rating').
Return a single JSON object where the keys are your inferred key names and the values are the corresponding example text from the document.
For the '{}', represent it as a multi-line string.

MODEL DOCUMENT TEXT:
---
{}
---"#,
        MULTILINE_FIELD, template_text
    )
}

/// Ask the service for the key → example-value mapping of the template
pub fn try_infer_placeholders(generator: &dyn TextGenerator, template_text: &str) -> Result<FieldMap> {
    let reply = generator.generate(&schema_prompt(template_text))?;
    Ok(parse_field_map(&reply)?)
}

/// Like [`try_infer_placeholders`], but reports failures and yields an empty map
pub fn infer_placeholders(generator: &dyn TextGenerator, template_text: &str) -> FieldMap {
    tracing::info!("Phase 1: Analyzing model document to infer structure...");
    match try_infer_placeholders(generator, template_text) {
        Ok(map) => {
            tracing::info!(fields = map.len(), "Analysis complete");
            if let Ok(pretty) = serde_json::to_string_pretty(&map) {
                tracing::info!("Inferred structure:\n{}", pretty);
            }
            map
        }
        Err(e) => {
            tracing::error!("Error during template analysis: {}", e);
            FieldMap::new()
        }
    }
}
