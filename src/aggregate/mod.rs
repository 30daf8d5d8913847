//! Combined summary documents: rendering, splitting back into per-file
//! artifacts, and prioritized recombination.

pub mod combine;
pub mod split;

pub use combine::{CombineReport, combine_prioritized, read_listing};
pub use split::{SummarySection, artifact_path, split_summaries, write_split};

use std::path::Path;

use crate::error::Result;

/// Header that opens every section of a combined document
pub const SECTION_MARKER: &str = "#Summary for";

/// Extension of per-file artifacts
pub const ARTIFACT_SUFFIX: &str = ".aispec.md";

/// Summary (or raw contents) of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub relative_path: String,
    pub text: String,
}

/// Render entries as one document, one `#Summary for <path>:` section each.
///
/// Entry text is written verbatim, trailing newlines included.
pub fn render_combined(entries: &[SummaryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(SECTION_MARKER);
        out.push(' ');
        out.push_str(&entry.relative_path);
        out.push_str(":\n\n");
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    out
}

/// Write the combined document, creating parent directories.
pub fn write_combined(path: &Path, entries: &[SummaryEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_combined(entries))?;
    log::info!("Combined {} summaries into {}", entries.len(), path.display());
    Ok(())
}
