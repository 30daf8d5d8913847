use aispec::Config;
use aispec::aggregate::combine_prioritized;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "combine")]
#[command(about = "Combine markdown files based on a prioritized list from a JSON file")]
struct Args {
    /// Path to the JSON file containing the list of filenames
    json_file: PathBuf,

    /// Maximum number of files to process
    #[arg(long)]
    max_files: Option<usize>,

    /// Directory the listed filenames are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Directory the combined file is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    let report = combine_prioritized(&args.json_file, args.max_files, &args.root, &args.out_dir)?;
    println!("Combined markdown written to {}", report.output_file.display());
    Ok(())
}
