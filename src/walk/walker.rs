use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::classify::is_source_code;
use super::ignore_set::IgnoreSet;
use crate::config::WalkConfig;
use crate::error::{AispecError, Result};

/// A source file selected for summarization
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the walk root, always with forward slashes
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub extension: String,
    pub file_size: u64,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Discover every source file under `root`.
///
/// Hidden directories are pruned unless `include_hidden` is set, ignored paths
/// (from the combined ignore files in `root`) are pruned, and the remaining
/// files are kept only when their extension is on the allow-list. Results are
/// sorted by relative path.
pub fn discover_files(root: &Path, config: &WalkConfig) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(AispecError::InvalidInput(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let ignore_set = IgnoreSet::load(root, &config.ignore_files)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Never prune the root itself, even if it is a dot-directory
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_dir();
            if is_dir && !config.include_hidden && is_hidden(entry) {
                return false;
            }
            !ignore_set.is_ignored(relative_to(entry.path(), root), is_dir)
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

        let path = entry.path();
        if !is_source_code(path, &config.extensions) {
            continue;
        }

        let metadata = entry.metadata()?;
        let relative_path = relative_to(path, root)
            .to_string_lossy()
            .replace('\\', "/");
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        files.push(SourceFile {
            relative_path,
            absolute_path: path.to_path_buf(),
            extension,
            file_size: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::info!("Discovered {} source files in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_discover_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("pkg/api")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("main.py"), "print('hi')").unwrap();
        fs::write(root.join("pkg/api/handler.go"), "package api").unwrap();
        fs::write(root.join("pkg/README.md"), "# Docs").unwrap();
        fs::write(root.join(".git/objects/hook.py"), "x = 1").unwrap();
        fs::write(root.join("logo.png"), b"\x89PNG\r\n\x1a\n").unwrap();

        let files = discover_files(root, &WalkConfig::default()).unwrap();

        assert_eq!(paths(&files), vec!["main.py", "pkg/api/handler.go"]);
        assert_eq!(files[1].extension, "go");
        assert_eq!(files[0].file_size, 11);
    }

    #[test]
    fn test_respects_combined_ignore_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "dist/\n").unwrap();
        fs::write(root.join(".aispecignore"), "generated_*.ts\n").unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("dist/bundle.js"), "var a;").unwrap();
        fs::write(root.join("src/app.ts"), "export {}").unwrap();
        fs::write(root.join("src/generated_api.ts"), "export {}").unwrap();

        let files = discover_files(root, &WalkConfig::default()).unwrap();
        assert_eq!(paths(&files), vec!["src/app.ts"]);
    }

    #[test]
    fn test_include_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".tools")).unwrap();
        fs::write(root.join(".tools/gen.rb"), "puts 1").unwrap();

        let config = WalkConfig {
            include_hidden: true,
            ..WalkConfig::default()
        };
        let files = discover_files(root, &config).unwrap();
        assert_eq!(paths(&files), vec![".tools/gen.rb"]);

        let files = discover_files(root, &WalkConfig::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_hidden_root_is_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join(".project");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("index.js"), "1").unwrap();

        let files = discover_files(&root, &WalkConfig::default()).unwrap();
        assert_eq!(paths(&files), vec!["index.js"]);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("single.py");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            discover_files(&file, &WalkConfig::default()),
            Err(AispecError::InvalidInput(_))
        ));
    }
}
