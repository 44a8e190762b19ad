use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use doc_intake::{
    config,
    fetch::HttpFetcher,
    logging,
    processing::{
        ClassificationDecision, WorkflowType, classifier::require_content_type, classify,
        condense_text, extractors::extract_text_blocking, sanitize::count_words,
    },
    summarization::{SummarizationAdapter, get_generative_model},
};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "intake-cli",
    about = "Inspect how the intake pipeline treats a file"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the routing decision for a content type.
    Classify { content_type: String },
    /// Extract text from a local file.
    Extract {
        path: PathBuf,
        #[arg(long)]
        content_type: String,
        /// Condense the text with the configured summarization provider.
        #[arg(long)]
        summarize: bool,
    },
}

#[tokio::main]
async fn main() {
    logging::init_cli_tracing();
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Classify { content_type } => {
            let decision = match require_content_type(&content_type) {
                Ok(normalized) => classify(&normalized),
                Err(fault) => ClassificationDecision::from(&fault),
            };
            print_json(&serde_json::to_value(&decision)?)
        }
        Command::Extract {
            path,
            content_type,
            summarize,
        } => extract(path, content_type, summarize).await,
    }
}

async fn extract(path: PathBuf, content_type: String, summarize: bool) -> Result<()> {
    let normalized = require_content_type(&content_type)?;
    let decision = classify(&normalized);
    if decision.workflow_type() != WorkflowType::TextProcessing {
        bail!("{normalized} is not a text document: {}", decision.reason());
    }

    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let text = extract_text_blocking(bytes, normalized.clone())
        .await
        .with_context(|| format!("extracting text from {}", path.display()))?;
    let word_count = count_words(&text);

    let mut output = json!({
        "content_type": normalized,
        "word_count": word_count,
        "text": text,
    });

    if summarize {
        config::init_config();
        let fetcher = Arc::new(HttpFetcher::from_config()?);
        let summarizer = SummarizationAdapter::from_model(get_generative_model(fetcher)?);
        let condensed = condense_text(&text, &summarizer)
            .await
            .context("summarizing extracted text")?;
        output["content"] = json!(condensed.content);
        output["summarized"] = json!(condensed.summarized);
    }

    print_json(&output)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
