use std::path::Path;

/// True when the file's extension is in the allow-list.
///
/// Matching is case-sensitive and allow-list entries may carry a leading dot
/// (`".py"` and `"py"` are equivalent). Dotfiles such as `.bashrc` have no
/// extension and never match.
pub fn is_source_code<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.as_ref().trim_start_matches('.') == ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: &[&str] = &["py", "js", "java", "cpp", "c", "cs", "ts", "php", "rb", "go"];

    #[test]
    fn test_accepts_listed_extensions() {
        assert!(is_source_code(Path::new("src/app.py"), DEFAULTS));
        assert!(is_source_code(Path::new("lib/util.go"), DEFAULTS));
        assert!(is_source_code(Path::new("a/b/c/Main.java"), DEFAULTS));
    }

    #[test]
    fn test_rejects_other_files() {
        assert!(!is_source_code(Path::new("README.md"), DEFAULTS));
        assert!(!is_source_code(Path::new("Makefile"), DEFAULTS));
        assert!(!is_source_code(Path::new(".py"), DEFAULTS));
        assert!(!is_source_code(Path::new("main.rs"), DEFAULTS));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!is_source_code(Path::new("SCRIPT.PY"), DEFAULTS));
    }

    #[test]
    fn test_leading_dot_in_allow_list() {
        assert!(is_source_code(Path::new("main.rs"), &[".rs"]));
    }
}
