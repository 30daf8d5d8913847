//! Triage report: text files by size with cumulative totals per extension.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SizesConfig;
use crate::error::Result;

/// Bytes inspected when deciding whether a file is text
const TEXT_SAMPLE_BYTES: usize = 1024;

/// A text file and its size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSize {
    pub relative_path: String,
    pub path: PathBuf,
    /// Extension including the dot, empty when there is none
    pub extension: String,
    pub size: u64,
}

/// True when the first bytes of the file decode as UTF-8.
///
/// A multi-byte character cut off by the sample boundary still counts as text.
pub fn is_text_file(path: &Path) -> bool {
    let mut buf = Vec::with_capacity(TEXT_SAMPLE_BYTES);
    let sample = std::fs::File::open(path)
        .and_then(|f| f.take(TEXT_SAMPLE_BYTES as u64).read_to_end(&mut buf));
    if sample.is_err() {
        return false;
    }
    match std::str::from_utf8(&buf) {
        Ok(_) => true,
        // error_len() is None only for an incomplete sequence at the very end
        Err(e) => e.error_len().is_none() && buf.len() == TEXT_SAMPLE_BYTES,
    }
}

fn extension_key(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

/// Collect every non-empty text file under `root`, smallest first.
///
/// Hidden files are included. Paths under an excluded top-level directory
/// (such as `node_modules`) are skipped.
pub fn collect_file_sizes(root: &Path, config: &SizesConfig) -> Result<Vec<FileSize>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
        if entry.depth() != 1 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !config.exclude_dirs.iter().any(|d| d.as_str() == name)
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry.metadata()?.len();
        if size == 0 || !is_text_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        files.push(FileSize {
            relative_path: path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/"),
            path: path.to_path_buf(),
            extension: extension_key(path),
            size,
        });
    }

    files.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.relative_path.cmp(&b.relative_path)));
    Ok(files)
}

/// Per-file running totals plus per-extension totals
#[derive(Debug)]
pub struct SizeReport {
    /// (file, cumulative size including this file), smallest first
    pub rows: Vec<(FileSize, u64)>,
    /// (extension, total size), smallest first
    pub by_extension: Vec<(String, u64)>,
    pub total: u64,
}

impl SizeReport {
    /// Build the report from files already sorted by size
    pub fn build(files: Vec<FileSize>) -> Self {
        let mut total = 0u64;
        let mut per_ext: HashMap<String, u64> = HashMap::new();
        let mut rows = Vec::with_capacity(files.len());

        for file in files {
            total += file.size;
            *per_ext.entry(file.extension.clone()).or_insert(0) += file.size;
            rows.push((file, total));
        }

        let mut by_extension: Vec<(String, u64)> = per_ext.into_iter().collect();
        by_extension.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            rows,
            by_extension,
            total,
        }
    }

    /// Share of the grand total, 0 when the total is 0
    pub fn percentage(&self, size: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            size as f64 / self.total as f64 * 100.0
        }
    }

    /// Render as text; `top` limits the file listing to the N largest files.
    pub fn render(&self, top: Option<usize>) -> String {
        let mut out = String::new();
        let skip = top.map_or(0, |n| self.rows.len().saturating_sub(n));

        for (file, cumulative) in self.rows.iter().skip(skip) {
            let _ = writeln!(
                out,
                "{} - {} bytes (Cumulative Size: {} bytes)",
                file.relative_path, file.size, cumulative
            );
        }

        out.push_str("\nCumulative Size by File Extension (Smallest to Largest):\n");
        for (ext, size) in &self.by_extension {
            let label = if ext.is_empty() { "No Extension" } else { ext.as_str() };
            let _ = writeln!(out, "{}: {} bytes ({:.2}%)", label, size, self.percentage(*size));
        }
        out
    }
}
