//! Combined gitignore-style matcher built from every ignore file found in the walk root.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

use crate::error::Result;

pub struct IgnoreSet {
    matcher: Gitignore,
    sources: usize,
}

impl IgnoreSet {
    /// Combine the named ignore files from `root` into one matcher.
    ///
    /// Files that do not exist are skipped. Lines that fail to parse are logged
    /// and skipped; the rest of the file still applies.
    pub fn load<S: AsRef<str>>(root: &Path, ignore_files: &[S]) -> Result<Self> {
        // Absolute root so relative query paths are never mistaken for root-prefixed ones
        let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut builder = GitignoreBuilder::new(base);
        let mut sources = 0;

        for name in ignore_files {
            let path = root.join(name.as_ref());
            if !path.is_file() {
                continue;
            }
            if let Some(err) = builder.add(&path) {
                log::warn!("Ignoring malformed entries in {}: {}", path.display(), err);
            }
            sources += 1;
        }

        let matcher = builder.build()?;
        log::debug!(
            "Loaded {} ignore file(s) with {} pattern(s) from {}",
            sources,
            matcher.num_ignores() + matcher.num_whitelists(),
            root.display()
        );
        Ok(Self { matcher, sources })
    }

    /// Number of ignore files that contributed patterns
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// True when `relative_path` (relative to the root) or one of its parent
    /// directories is ignored.
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }
}
