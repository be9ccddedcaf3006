//! Run configuration
//!
//! Settings come from an optional JSON file, then environment variables
//! (including a local `.env` file), then CLI overrides applied by the binary.
//! The resolved value is passed explicitly to every component that needs it.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::mask_secret;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const MODEL_ENV: &str = "SDS_FILLER_MODEL";
pub const SETTINGS_FILE_NAME: &str = "sds-filler.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("API key not found. Please set the GOOGLE_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Model document whose example values get replaced
    #[serde(default = "default_model_docx")]
    pub model_docx_path: PathBuf,
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_pdf_file_name")]
    pub pdf_file_name: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Inferred keys whose extracted values get translated
    #[serde(default = "default_fields_to_translate")]
    pub fields_to_translate: Vec<String>,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_model_docx() -> PathBuf {
    PathBuf::from("Model_Template.docx")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input_data")
}

fn default_pdf_file_name() -> String {
    "SDS_potassium-hydroxide-solid_original-id-150559.pdf".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_data")
}

fn default_fields_to_translate() -> Vec<String> {
    [
        "document_title",
        "document_subtitle",
        "pictogram_notes",
        "ppe_header",
        "ppe_notes",
        "hmis_table_header_category",
        "hmis_table_header_rating",
        "hmis_health_category_label",
        "hmis_flammability_category_label",
        "hmis_physical_hazard_category_label",
        "hmis_ppe_category_label",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Hindi".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_timeout(),
            model_docx_path: default_model_docx(),
            input_dir: default_input_dir(),
            pdf_file_name: default_pdf_file_name(),
            output_dir: default_output_dir(),
            fields_to_translate: default_fields_to_translate(),
            source_language: default_source_language(),
            target_language: default_target_language(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, or defaults when the file does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve settings: file (explicit or discovered), `.env`, then process env.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // A missing .env is normal; real environment variables win over it.
        let _ = dotenvy::dotenv();

        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover_settings_file(),
        };
        let mut settings = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading settings file");
                Settings::from_file(&p)?
            }
            None => Settings::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Environment variables take precedence over stored settings
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.google_api_key = Some(key);
        }
        if let Some(model) = non_empty_env(MODEL_ENV) {
            self.model = model;
        }
    }

    /// The service credential; absence is a fatal startup condition
    pub fn api_key(&self) -> Result<&str> {
        self.google_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SettingsError::MissingApiKey)
    }

    /// Masked API key for display
    pub fn masked_api_key(&self) -> Option<String> {
        self.google_api_key.as_deref().map(mask_secret)
    }

    pub fn input_pdf_path(&self) -> PathBuf {
        self.input_dir.join(&self.pdf_file_name)
    }

    pub fn output_docx_path(&self) -> PathBuf {
        crate::utils::converted_output_path(&self.output_dir, &self.pdf_file_name)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// `sds-filler.json` in the working directory, else the user config directory
fn discover_settings_file() -> Option<PathBuf> {
    let local = PathBuf::from(SETTINGS_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|p| p.join("sds-filler").join("settings.json"))
        .filter(|p| p.exists())
}
