//! Phase 3: translate designated fields one at a time
//!
//! Each field is independent: a failed translation keeps the original value
//! and the loop moves on.

use serde_json::Value;

use crate::ai_client::{AiError, TextGenerator};
use crate::fields::{is_truthy, value_to_text, FieldMap};

use super::Result;

#[derive(Debug, Clone, Copy)]
pub struct Languages<'a> {
    pub source: &'a str,
    pub target: &'a str,
}

pub fn translation_prompt(text: &str, languages: &Languages) -> String {
    format!(
        "Translate the following {} phrase to {}. Provide only the translation. Phrase: '{}'",
        languages.source, languages.target, text
    )
}

/// Translate one value; an empty reply counts as a failure
pub fn translate_value(generator: &dyn TextGenerator, text: &str, languages: &Languages) -> Result<String> {
    let reply = generator.generate(&translation_prompt(text, languages))?;
    let translated = reply.trim();
    if translated.is_empty() {
        return Err(AiError::EmptyResponse { reason: None }.into());
    }
    Ok(translated.to_string())
}

/// Translate every listed key that is present with a non-empty value.
///
/// Returns how many values were replaced.
pub fn translate_fields(
    generator: &dyn TextGenerator,
    data: &mut FieldMap,
    fields_to_translate: &[String],
    languages: &Languages,
) -> usize {
    tracing::info!("Phase 3: Translating designated fields...");
    let mut translated = 0;

    for field in fields_to_translate {
        let original = match data.get(field) {
            Some(value) if is_truthy(value) => value_to_text(value),
            _ => continue,
        };

        match translate_value(generator, &original, languages) {
            Ok(text) => {
                data.insert(field.clone(), Value::String(text));
                translated += 1;
                tracing::info!("  - Translated '{}'", field);
            }
            Err(e) => {
                tracing::warn!("  - Warning: Translation failed for field '{}': {}", field, e);
            }
        }
    }

    translated
}
