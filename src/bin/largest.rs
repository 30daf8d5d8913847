use aispec::Config;
use aispec::sizes::{SizeReport, collect_file_sizes};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "largest")]
#[command(about = "List text files by size with cumulative totals per extension")]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Only list the N largest files
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    let files = collect_file_sizes(&args.directory, &config.sizes)?;
    log::info!("{} text files under {}", files.len(), args.directory.display());

    let report = SizeReport::build(files);
    print!("{}", report.render(args.top));
    Ok(())
}
