pub mod config;
pub mod error;
pub mod walk;
pub mod summarize;
pub mod aggregate;
pub mod sizes;
pub mod upload;


pub use config::Config;
pub use error::{AispecError, Result};
pub use aggregate::{SummaryEntry, render_combined, split_summaries, write_combined};
pub use summarize::{InferenceClient, SummaryMode, summarize_tree};
pub use walk::{SourceFile, discover_files};

/// Initialize `env_logger` from `RUST_LOG`, falling back to `default_level`.
pub fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level))
        .init();
}
