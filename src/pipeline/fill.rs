//! Phase 4: substitute example values with extracted values in a copy of the
//! model document

use std::path::Path;

use crate::docx::Document;
use crate::fields::{value_to_text, FieldMap};

use super::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Replacements attempted
    pub replacements: usize,
    /// Runs whose text changed
    pub runs_rewritten: usize,
}

/// Pair each template example value with the extracted value of the same key.
///
/// Keys missing from either side are dropped. Empty example values are
/// skipped. When two keys share an example value the later key's value wins.
pub fn build_replacements(template: &FieldMap, data: &FieldMap) -> Vec<Replacement> {
    let mut replacements: Vec<Replacement> = Vec::new();

    for (key, example) in template {
        let Some(value) = data.get(key) else {
            continue;
        };
        let old = value_to_text(example);
        if old.is_empty() {
            tracing::debug!(key = %key, "skipping field with empty example value");
            continue;
        }
        let new = value_to_text(value);

        match replacements.iter_mut().find(|r| r.old == old) {
            Some(existing) => existing.new = new,
            None => replacements.push(Replacement { old, new }),
        }
    }

    replacements
}

/// Apply replacements in order; returns the number of runs rewritten
pub fn apply_replacements(doc: &mut Document, replacements: &[Replacement]) -> usize {
    replacements
        .iter()
        .map(|r| doc.replace_text(&r.old, &r.new))
        .sum()
}

/// Copy the model document to `output_path` with every replacement applied
pub fn generate_final_document(
    template_path: &Path,
    output_path: &Path,
    template: &FieldMap,
    data: &FieldMap,
) -> Result<FillReport> {
    tracing::info!("Phase 4: Generating final document...");

    let replacements = build_replacements(template, data);
    tracing::debug!(count = replacements.len(), "built replacement set");

    let mut doc = Document::open(template_path)?;
    let runs_rewritten = apply_replacements(&mut doc, &replacements);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PipelineError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    doc.save(output_path)?;

    Ok(FillReport {
        replacements: replacements.len(),
        runs_rewritten,
    })
}
