//! Summarize every source file in a tree and write one combined document.

use aispec::summarize::resolve_credential;
use aispec::{Config, InferenceClient, SummaryMode, summarize_tree, write_combined};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "summarize")]
#[command(about = "Process files for summarization")]
struct Args {
    /// Directory to process (defaults to current directory)
    directory: Option<PathBuf>,

    /// Combined output file (overrides output.summary_file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model name (overrides inference.model)
    #[arg(long)]
    model: Option<String>,

    /// Generate endpoint URL (overrides inference.api_url)
    #[arg(long)]
    api_url: Option<String>,

    /// Concatenate raw file contents instead of calling the endpoint
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    if let Some(model) = args.model {
        config.inference.model = model;
    }
    if let Some(api_url) = args.api_url {
        config.inference.api_url = api_url;
    }
    config.validate()?;

    let root = match args.directory {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current dir")?,
    };
    let output = args.output.unwrap_or_else(|| config.output.summary_file.clone());
    let mode = if args.raw { SummaryMode::Raw } else { SummaryMode::Summarize };

    log::info!("Summarizing {}", root.display());
    let client = match mode {
        SummaryMode::Raw => {
            log::info!("Mode: raw contents (no endpoint calls)");
            None
        }
        SummaryMode::Summarize => {
            let credential = resolve_credential(&config.inference).await?;
            log::info!(
                "Model: {} at {} ({})",
                config.inference.model,
                config.inference.api_url,
                if credential.is_some() { "authenticated" } else { "no auth" }
            );
            Some(InferenceClient::new(&config.inference, credential)?)
        }
    };

    let start = Instant::now();
    let run = summarize_tree(&root, &config, client.as_ref(), mode).await?;

    if run.discovered == 0 {
        log::warn!("No source files found under {}", root.display());
    }

    write_combined(&output, &run.entries)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!("=== Summarization Complete ===");
    log::info!("Files discovered: {}", run.discovered);
    log::info!("Files processed: {} (errors: {})", run.processed, run.failed);
    log::info!("Output: {}", output.display());
    log::info!("Time: {:?}", start.elapsed());

    if run.failed > 0 {
        log::warn!("Some files failed to summarize. Check logs above for details.");
    }

    Ok(())
}
