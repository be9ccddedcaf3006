//! sds-filler - Convert an SDS PDF into a filled copy of a Word model document
//!
//! Usage: sds-filler [OPTIONS] [PDF]
//!
//! Reads `GOOGLE_API_KEY` from the environment (or `.env`).

use clap::Parser;
use sds_filler::{pipeline, AiError, GeminiClient, RunOutcome, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sds-filler")]
#[command(version, about = "Fill a model DOCX with data extracted from an SDS PDF", long_about = None)]
struct Cli {
    /// PDF file name inside the input directory
    pdf: Option<String>,

    /// Directory holding the input PDF
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Model document to analyze and fill
    #[arg(long)]
    model_docx: Option<PathBuf>,

    /// Directory for the converted document
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Settings file (default: ./sds-filler.json, then the user config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Language to translate designated fields into
    #[arg(long)]
    target_language: Option<String>,

    /// Field to translate; repeat to list several (replaces the configured list)
    #[arg(long = "translate", value_name = "KEY")]
    translate: Vec<String>,

    /// Detailed logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(pdf) = self.pdf {
            settings.pdf_file_name = pdf;
        }
        if let Some(dir) = self.input_dir {
            settings.input_dir = dir;
        }
        if let Some(path) = self.model_docx {
            settings.model_docx_path = path;
        }
        if let Some(dir) = self.output_dir {
            settings.output_dir = dir;
        }
        if let Some(lang) = self.target_language {
            settings.target_language = lang;
        }
        if !self.translate.is_empty() {
            settings.fields_to_translate = self.translate;
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "sds_filler=debug" } else { "sds_filler=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve settings with CLI overrides and build the service client
fn configure(cli: Cli) -> Result<(Settings, GeminiClient), AiError> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    cli.apply(&mut settings);
    let client = GeminiClient::from_settings(&settings)?;
    Ok((settings, client))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (settings, client) = match configure(cli) {
        Ok(configured) => configured,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        model = %settings.model,
        key = %settings.masked_api_key().unwrap_or_default(),
        "Gemini API configured successfully"
    );

    let outcome = pipeline::run(&settings, &client);

    let usage = client.usage();
    tracing::info!(
        requests = usage.requests,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Token usage"
    );

    if let RunOutcome::Completed { output, report } = outcome {
        tracing::info!(
            replacements = report.replacements,
            runs_rewritten = report.runs_rewritten,
            "Wrote {}",
            output.display()
        );
    }
}
