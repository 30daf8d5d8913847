//! Summarization pipeline: walk the tree, send each source file to the
//! inference endpoint, collect the per-file summaries in walk order.

pub mod client;
pub mod credential;
pub mod prompt;

pub use client::{InferenceClient, StreamAccumulator};
pub use credential::{Credential, resolve_credential, run_credential_command};
pub use prompt::build_prompt;

use std::path::Path;

use crate::aggregate::SummaryEntry;
use crate::config::Config;
use crate::error::{AispecError, Result};
use crate::walk::{SourceFile, discover_files};

/// What each file contributes to the combined document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    /// Ask the endpoint for a summary
    Summarize,
    /// Use the file contents verbatim; no endpoint calls
    Raw,
}

/// Outcome of one pass over a tree
#[derive(Debug, Default)]
pub struct SummaryRun {
    pub entries: Vec<SummaryEntry>,
    pub discovered: usize,
    pub processed: usize,
    pub failed: usize,
}

async fn summarize_file(
    file: &SourceFile,
    config: &Config,
    client: Option<&InferenceClient>,
) -> Result<String> {
    let content = std::fs::read_to_string(&file.absolute_path)?;

    match client {
        None => Ok(content),
        Some(client) => {
            let prompt = build_prompt(&config.inference.prompt, &content);
            client.generate_with_retry(&prompt).await
        }
    }
}

/// Summarize every source file under `root`, one request at a time.
///
/// Files that fail are logged and counted; they do not stop the run.
pub async fn summarize_tree(
    root: &Path,
    config: &Config,
    client: Option<&InferenceClient>,
    mode: SummaryMode,
) -> Result<SummaryRun> {
    if mode == SummaryMode::Summarize && client.is_none() {
        return Err(AispecError::InvalidInput(
            "summarize mode needs an inference client".to_string(),
        ));
    }
    let client = match mode {
        SummaryMode::Summarize => client,
        SummaryMode::Raw => None,
    };

    let files = discover_files(root, &config.walk)?;
    let total = files.len();
    let mut run = SummaryRun {
        discovered: total,
        ..SummaryRun::default()
    };

    for (idx, file) in files.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", idx + 1, total, file.relative_path);

        match summarize_file(file, config, client).await {
            Ok(text) => {
                log::info!("✓ {} ({} chars)", file.relative_path, text.len());
                run.processed += 1;
                run.entries.push(SummaryEntry {
                    relative_path: file.relative_path.clone(),
                    text,
                });
            }
            Err(e) => {
                run.failed += 1;
                log::error!("✗ {}: {}", file.relative_path, e);
            }
        }
    }

    Ok(run)
}
