/// Placeholder replaced by the file contents inside a prompt template.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Render a prompt for one file.
///
/// Templates without a placeholder get the content appended after a blank line.
pub fn build_prompt(template: &str, content: &str) -> String {
    if template.contains(CONTENT_PLACEHOLDER) {
        template.replace(CONTENT_PLACEHOLDER, content)
    } else {
        format!("{}\n\n{}", template.trim_end(), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROMPT;

    #[test]
    fn test_placeholder_substitution() {
        let prompt = build_prompt("Explain:\n{content}\nDone.", "def f(): pass");
        assert_eq!(prompt, "Explain:\ndef f(): pass\nDone.");
    }

    #[test]
    fn test_append_without_placeholder() {
        let prompt = build_prompt("Summarize this file. ", "int main() {}");
        assert_eq!(prompt, "Summarize this file.\n\nint main() {}");
    }

    #[test]
    fn test_default_prompt_ends_with_content() {
        let prompt = build_prompt(DEFAULT_PROMPT, "class A: pass");
        assert!(prompt.starts_with("summarize this code"));
        assert!(prompt.ends_with("Here is the code:\n\n class A: pass"));
    }
}
