use aispec::Config;
use aispec::aggregate::{split_summaries, write_split};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "split")]
#[command(about = "Split a combined summary file into individual .aispec.md files")]
struct Args {
    /// Path to the input file containing summaries
    input_file: PathBuf,

    /// Directory that relative summary paths are resolved against
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    let content = std::fs::read_to_string(&args.input_file)
        .with_context(|| format!("Failed to read {}", args.input_file.display()))?;

    let sections = split_summaries(&content);
    if sections.is_empty() {
        log::warn!("No '#Summary for' sections found in {}", args.input_file.display());
        return Ok(());
    }

    let written = write_split(&sections, &args.out_dir)?;
    log::info!("Wrote {} summary file(s)", written.len());
    Ok(())
}
