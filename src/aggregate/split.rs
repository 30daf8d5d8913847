use regex::Regex;
use std::path::{Path, PathBuf};

use super::{ARTIFACT_SUFFIX, SECTION_MARKER};
use crate::error::{AispecError, Result};

/// One `#Summary for <path>:` section of a combined document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySection {
    pub path: String,
    /// Section text verbatim, header line included
    pub text: String,
}

/// Split a combined document before every section marker.
///
/// The marker stays with the section it opens. Segments without a
/// `#Summary for <path>:` header (a preamble, or a marker line lacking the
/// colon) are dropped.
pub fn split_summaries(content: &str) -> Vec<SummarySection> {
    // The capture is greedy up to the last colon on the header line
    let header = Regex::new(r"#Summary for (.*):").expect("Invalid regex pattern");

    let mut starts: Vec<usize> = content.match_indices(SECTION_MARKER).map(|(i, _)| i).collect();
    starts.push(content.len());

    starts
        .windows(2)
        .filter_map(|w| {
            let segment = &content[w[0]..w[1]];
            let path = header.captures(segment)?.get(1)?.as_str().to_string();
            Some(SummarySection {
                path,
                text: segment.to_string(),
            })
        })
        .collect()
}

/// Location of the artifact for `path`; relative paths resolve against `out_dir`.
pub fn artifact_path(path: &str, out_dir: &Path) -> PathBuf {
    let target = PathBuf::from(format!("{}{}", path, ARTIFACT_SUFFIX));
    if target.is_absolute() {
        target
    } else {
        out_dir.join(target)
    }
}

/// Write each section to `<path>.aispec.md`, creating parent directories.
pub fn write_split(sections: &[SummarySection], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(sections.len());

    for section in sections {
        if section.path.trim().is_empty() {
            return Err(AispecError::Parse(
                "section header names an empty path".to_string(),
            ));
        }
        let target = artifact_path(&section.path, out_dir);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &section.text)?;
        log::info!("Written summary to {}", target.display());
        written.push(target);
    }

    Ok(written)
}
