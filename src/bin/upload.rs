//! Upload text files into a DynamoDB table in size-limited parts.

use aispec::Config;
use aispec::upload::{BackoffPolicy, DynamoStore, Uploader, chunk_data, concat_files};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "upload")]
#[command(about = "Upload files into a key-value table in chunks")]
struct Args {
    /// Target table name
    table_name: String,

    /// Partition key value (projectPath)
    project_path: String,

    /// Sort key prefix (dataPath); parts are stored as <DATA_PATH>_part<N>
    data_path: String,

    /// Files to concatenate and upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    let data = concat_files(&args.files)?;
    let chunks = chunk_data(&data, config.upload.max_chunk_bytes)?;
    log::info!(
        "Uploading {} bytes from {} file(s) as {} part(s) to {}",
        data.len(),
        args.files.len(),
        chunks.len(),
        args.table_name
    );

    let store = DynamoStore::new(
        args.table_name,
        config.upload.region.clone(),
        config.upload.endpoint_url.clone(),
    )
    .await;
    let uploader = Uploader::new(store, BackoffPolicy::from(&config.upload));

    let report = uploader.upload(&args.project_path, &args.data_path, chunks).await?;
    log::info!(
        "Upload complete: {} part(s), {} bytes, {} throttled attempt(s)",
        report.parts.len(),
        report.bytes,
        report.throttled
    );
    Ok(())
}
