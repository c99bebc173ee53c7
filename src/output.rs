use std::path::Path;

use eyre::Result;
use log::debug;

/// The first `max_chars` characters of `text`, cut on a char boundary
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render a titled section for terminal output
pub fn render_section(title: &str, body: &str) -> String {
    format!("\n{title}:\n\n{body}")
}

/// Write the final summary to `path`
pub fn save_summary(path: &Path, summary: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, summary)?;
    debug!("Saved summary to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_shorter_than_limit() {
        assert_eq!(preview("hello", 1000), "hello");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("hello world", 5), "hello");
    }

    #[test]
    fn test_preview_multibyte() {
        assert_eq!(preview("héllo", 2), "hé");
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(preview("", 10), "");
    }

    #[test]
    fn test_render_section() {
        assert_eq!(render_section("SUMMARY", "text"), "\nSUMMARY:\n\ntext");
    }

    #[test]
    fn test_save_summary() {
        let dir = std::env::temp_dir().join(format!("ytsum-test-{}", std::process::id()));
        let path = dir.join("nested").join("summary.txt");
        save_summary(&path, "the summary").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "the summary");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
