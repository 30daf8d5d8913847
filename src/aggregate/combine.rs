//! Recombine per-file artifacts in the order given by a prioritized listing.

use serde_json::Value;
use std::path::{Path, PathBuf};

use super::split::artifact_path;
use crate::error::{AispecError, Result};

/// Result of a prioritized combine
#[derive(Debug)]
pub struct CombineReport {
    pub output_file: PathBuf,
    pub combined: usize,
    pub missing: usize,
}

/// Read the ordered filenames from a listing.
///
/// The listing is `{"files": {...}}`, whose keys in document order are the
/// filenames, or `{"files": [...]}`, or a bare array of filenames.
pub fn read_listing(listing: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(listing)?;
    let data: Value = serde_json::from_str(&raw)?;

    let files = match &data {
        Value::Array(_) => &data,
        Value::Object(root) => root.get("files").ok_or_else(|| {
            AispecError::Parse(format!("{} has no `files` member", listing.display()))
        })?,
        other => {
            return Err(AispecError::Parse(format!(
                "listing must be an object or an array, got {}",
                other
            )))
        }
    };

    match files {
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    AispecError::Parse(format!("non-string entry in files: {}", item))
                })
            })
            .collect(),
        other => Err(AispecError::Parse(format!(
            "`files` must be an object or an array, got {}",
            other
        ))),
    }
}

/// Name of the combined output for an optional cap
pub fn output_name(max_files: Option<usize>) -> String {
    match max_files {
        Some(n) => format!("aispec_combined_prioritized_{}.md", n),
        None => "aispec_combined_prioritized.md".to_string(),
    }
}

/// Concatenate existing `<filename>.aispec.md` artifacts in listing order.
///
/// Missing artifacts are skipped and do not count towards `max_files`.
/// Artifacts are looked up relative to `artifact_root`; the output lands in `out_dir`.
pub fn combine_prioritized(
    listing: &Path,
    max_files: Option<usize>,
    artifact_root: &Path,
    out_dir: &Path,
) -> Result<CombineReport> {
    let filenames = read_listing(listing)?;
    let mut combined_content = String::new();
    let mut combined = 0;
    let mut missing = 0;

    for filename in &filenames {
        if max_files.is_some_and(|max| combined >= max) {
            break;
        }
        let md_path = artifact_path(filename, artifact_root);
        if !md_path.is_file() {
            log::debug!("No artifact for {}", filename);
            missing += 1;
            continue;
        }
        combined_content.push_str(&std::fs::read_to_string(&md_path)?);
        combined_content.push_str("\n\n");
        combined += 1;
    }

    std::fs::create_dir_all(out_dir)?;
    let output_file = out_dir.join(output_name(max_files));
    std::fs::write(&output_file, combined_content)?;
    log::info!(
        "Combined markdown written to {} ({} files, {} without artifact)",
        output_file.display(),
        combined,
        missing
    );

    Ok(CombineReport {
        output_file,
        combined,
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/z.py.aispec.md"), "Z").unwrap();
        fs::write(root.join("src/a.py.aispec.md"), "A").unwrap();
        fs::write(root.join("m.go.aispec.md"), "M").unwrap();
        fs::write(
            root.join("priority.json"),
            r#"{"files": {"src/z.py": 9, "gone.rb": 8, "src/a.py": 5, "m.go": 1}}"#,
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_listing_keeps_document_order() {
        let temp_dir = fixture();
        let names = read_listing(&temp_dir.path().join("priority.json")).unwrap();
        assert_eq!(names, vec!["src/z.py", "gone.rb", "src/a.py", "m.go"]);
    }

    #[test]
    fn test_listing_array_form() {
        let temp_dir = TempDir::new().unwrap();
        let listing = temp_dir.path().join("l.json");
        fs::write(&listing, r#"{"files": ["b", "a"]}"#).unwrap();
        assert_eq!(read_listing(&listing).unwrap(), vec!["b", "a"]);

        fs::write(&listing, r#"{"files": "a"}"#).unwrap();
        assert!(matches!(read_listing(&listing), Err(AispecError::Parse(_))));
    }

    #[test]
    fn test_listing_bare_array() {
        let temp_dir = TempDir::new().unwrap();
        let listing = temp_dir.path().join("l.json");
        fs::write(&listing, r#"["a.py", "b.py"]"#).unwrap();
        assert_eq!(read_listing(&listing).unwrap(), vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_listing_without_files_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let listing = temp_dir.path().join("l.json");
        fs::write(&listing, r#"{"filez": {"a.py": 1}}"#).unwrap();
        assert!(matches!(read_listing(&listing), Err(AispecError::Parse(_))));

        fs::write(&listing, "42").unwrap();
        assert!(matches!(read_listing(&listing), Err(AispecError::Parse(_))));

        let out = temp_dir.path().join("out");
        assert!(combine_prioritized(&listing, None, temp_dir.path(), &out).is_err());
        assert!(!out.join(output_name(None)).exists());
    }

    #[test]
    fn test_combine_all() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let report = combine_prioritized(&root.join("priority.json"), None, root, root).unwrap();

        assert_eq!(report.combined, 3);
        assert_eq!(report.missing, 1);
        assert_eq!(report.output_file, root.join("aispec_combined_prioritized.md"));
        assert_eq!(fs::read_to_string(&report.output_file).unwrap(), "Z\n\nA\n\nM\n\n");
    }

    #[test]
    fn test_combine_with_cap_skips_missing_without_counting() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let out = root.join("out");
        let report = combine_prioritized(&root.join("priority.json"), Some(2), root, &out).unwrap();

        assert_eq!(report.combined, 2);
        assert_eq!(report.output_file, out.join("aispec_combined_prioritized_2.md"));
        assert_eq!(fs::read_to_string(&report.output_file).unwrap(), "Z\n\nA\n\n");
    }
}
