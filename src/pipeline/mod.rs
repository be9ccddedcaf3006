//! The four-phase conversion of an SDS PDF into a filled model document
//!
//! 1. Infer the field schema from the model document's text
//! 2. Extract the same fields from the PDF's text
//! 3. Translate the configured fields
//! 4. Substitute example values with extracted values in a copy of the model
//!
//! Phases 1-2 halt the run on any failure (an empty result). Translation
//! failures are per-field and never halt the run.

pub mod extract;
pub mod fill;
pub mod schema;
pub mod translate;

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ai_client::{AiError, TextGenerator};
use crate::docx::{Document, DocxError};
use crate::fields::ResponseError;
use crate::pdf_extractor::{self, PdfError};
use crate::settings::Settings;

pub use extract::{extract_field_values, try_extract_field_values};
pub use fill::{build_replacements, generate_final_document, FillReport, Replacement};
pub use schema::{infer_placeholders, try_infer_placeholders};
pub use translate::{translate_fields, Languages};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document error: {0}")]
    Docx(#[from] DocxError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Service call failed: {0}")]
    Ai(#[from] AiError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TemplateText,
    Schema,
    PdfText,
    Extraction,
    Generate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::TemplateText => "model document text",
            Phase::Schema => "template analysis",
            Phase::PdfText => "PDF text",
            Phase::Extraction => "data extraction",
            Phase::Generate => "document generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { output: PathBuf, report: FillReport },
    /// A phase produced nothing; later phases were skipped
    Halted(Phase),
}

/// Full text of the model document, or empty on any read error
pub fn extract_template_text(path: &Path) -> String {
    match Document::open(path) {
        Ok(doc) => doc.full_text(),
        Err(e) => {
            tracing::error!(path = %path.display(), "Error reading DOCX file: {}", e);
            String::new()
        }
    }
}

/// Full text of the PDF, or `None` on any read error
pub fn extract_pdf_text(path: &Path) -> Option<String> {
    match pdf_extractor::extract_text_from_pdf(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(path = %path.display(), "Error reading PDF file: {}", e);
            None
        }
    }
}

/// Run every phase in order, stopping at the first one that yields nothing
pub fn run(settings: &Settings, generator: &dyn TextGenerator) -> RunOutcome {
    let template_text = extract_template_text(&settings.model_docx_path);
    if template_text.is_empty() {
        return halt(Phase::TemplateText);
    }

    let template_data = infer_placeholders(generator, &template_text);
    if template_data.is_empty() {
        return halt(Phase::Schema);
    }

    let pdf_path = settings.input_pdf_path();
    let pdf_text = match extract_pdf_text(&pdf_path) {
        Some(text) if !text.trim().is_empty() => text,
        Some(_) => {
            tracing::error!(path = %pdf_path.display(), "PDF contains no extractable text");
            return halt(Phase::PdfText);
        }
        None => return halt(Phase::PdfText),
    };

    let fields: Vec<String> = template_data.keys().cloned().collect();
    let mut final_data = extract_field_values(generator, &fields, &pdf_text);
    if final_data.is_empty() {
        return halt(Phase::Extraction);
    }

    let languages = Languages {
        source: &settings.source_language,
        target: &settings.target_language,
    };
    translate_fields(generator, &mut final_data, &settings.fields_to_translate, &languages);

    let output = settings.output_docx_path();
    match generate_final_document(&settings.model_docx_path, &output, &template_data, &final_data) {
        Ok(report) => {
            tracing::info!("Successfully created final document: {}", output.display());
            RunOutcome::Completed { output, report }
        }
        Err(e) => {
            tracing::error!("Error while generating the final document: {}", e);
            halt(Phase::Generate)
        }
    }
}

fn halt(phase: Phase) -> RunOutcome {
    tracing::warn!("Stopping: {} produced no result, skipping remaining phases", phase);
    RunOutcome::Halted(phase)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted stand-in for the text-generation service

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::ai_client::{AiError, Result, TextGenerator};

    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: RefCell<VecDeque<Result<String>>>,
        pub prompts: RefCell<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, text: &str) -> Self {
            self.replies.borrow_mut().push_back(Ok(text.to_string()));
            self
        }

        pub fn fail(self, status: u16) -> Self {
            self.replies.borrow_mut().push_back(Err(AiError::Api {
                status,
                body: "service unavailable".to_string(),
            }));
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.borrow().len()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(AiError::EmptyResponse { reason: None }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedGenerator;
    use super::*;
    use crate::docx::test_support::{build_docx, para};
    use crate::pdf_extractor::test_support::build_pdf;

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            model_docx_path: dir.join("Model_Template.docx"),
            input_dir: dir.join("input_data"),
            pdf_file_name: "sheet.pdf".to_string(),
            output_dir: dir.join("output_data"),
            ..Settings::default()
        }
    }

    #[test]
    fn test_empty_template_stops_before_service() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.model_docx_path, build_docx("")).unwrap();

        let generator = ScriptedGenerator::new().reply(r#"{"a": "x"}"#);
        let outcome = run(&settings, &generator);

        assert_eq!(outcome, RunOutcome::Halted(Phase::TemplateText));
        assert_eq!(generator.calls(), 0);
        assert!(!settings.output_docx_path().exists());
        assert!(!settings.output_dir.exists());
    }

    #[test]
    fn test_missing_template_stops() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let generator = ScriptedGenerator::new();
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::TemplateText));
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn test_malformed_schema_stops_before_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.model_docx_path, build_docx(&para(&["Product: Acme Lye"]))).unwrap();

        let generator = ScriptedGenerator::new().reply("I could not find any fields.");
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::Schema));
        assert_eq!(generator.calls(), 1);
        assert!(!settings.output_docx_path().exists());
    }

    #[test]
    fn test_unreadable_pdf_stops_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.model_docx_path, build_docx(&para(&["Product: Acme Lye"]))).unwrap();
        std::fs::create_dir_all(&settings.input_dir).unwrap();
        std::fs::write(settings.input_pdf_path(), b"%PDF-1.4 truncated").unwrap();

        let generator = ScriptedGenerator::new().reply(r#"{"product_name": "Acme Lye"}"#);
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::PdfText));
        assert_eq!(generator.calls(), 1);
        assert!(!settings.output_docx_path().exists());
    }

    /// Model with one example value and a two-page SDS in place
    fn write_inputs(settings: &Settings) {
        std::fs::write(&settings.model_docx_path, build_docx(&para(&["Product: Acme Lye"]))).unwrap();
        std::fs::create_dir_all(&settings.input_dir).unwrap();
        std::fs::write(
            settings.input_pdf_path(),
            build_pdf(&["SECTION 1 Identification", "Potassium hydroxide"]),
        )
        .unwrap();
    }

    #[test]
    fn test_blank_paragraphs_still_reach_service() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.model_docx_path, build_docx("<w:p/><w:p/>")).unwrap();

        let generator = ScriptedGenerator::new().reply("{}");
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::Schema));
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn test_run_completes_with_filled_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_inputs(&settings);

        let generator = ScriptedGenerator::new()
            .reply(r#"{"product_name": "Acme Lye"}"#)
            .reply("```json\n{\"product_name\": \"Potassium hydroxide\"}\n```");
        let outcome = run(&settings, &generator);

        let output = settings.output_docx_path();
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                output: output.clone(),
                report: FillReport { replacements: 1, runs_rewritten: 1 },
            }
        );
        assert_eq!(generator.calls(), 2);
        let prompts = generator.prompts.borrow();
        let identification = prompts[1].find("SECTION 1 Identification").unwrap();
        let product = prompts[1].find("Potassium hydroxide").unwrap();
        assert!(identification < product);
        assert_eq!(Document::open(&output).unwrap().full_text(), "Product: Potassium hydroxide");
    }

    #[test]
    fn test_malformed_extraction_stops_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_inputs(&settings);

        let generator = ScriptedGenerator::new()
            .reply(r#"{"product_name": "Acme Lye"}"#)
            .reply("The product is potassium hydroxide.");
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::Extraction));
        assert_eq!(generator.calls(), 2);
        assert!(!settings.output_dir.exists());
    }

    #[test]
    fn test_unwritable_output_halts_generation() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_inputs(&settings);
        std::fs::write(&settings.output_dir, b"not a directory").unwrap();

        let generator = ScriptedGenerator::new()
            .reply(r#"{"product_name": "Acme Lye"}"#)
            .reply(r#"{"product_name": "Potassium hydroxide"}"#);
        assert_eq!(run(&settings, &generator), RunOutcome::Halted(Phase::Generate));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Extraction.to_string(), "data extraction");
    }
}
