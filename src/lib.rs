//! Fill a Word model document with data read from a Safety Data Sheet PDF
//!
//! The model document's variable fields are inferred by a text-generation
//! service, the same fields are extracted from the PDF, selected fields are
//! translated, and the values are substituted into a copy of the model.

pub mod ai_client;
pub mod docx;
pub mod fields;
pub mod pdf_extractor;
pub mod pipeline;
pub mod settings;
pub mod utils;

pub use ai_client::{AiError, GeminiClient, TextGenerator, TokenUsage};
pub use fields::FieldMap;
pub use pipeline::{run, Phase, PipelineError, RunOutcome};
pub use settings::Settings;
