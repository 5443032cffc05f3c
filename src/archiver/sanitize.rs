use crate::constants::{MAX_FILENAME_BYTES, MAX_FILENAME_LENGTH};

/// Device names some filesystems refuse as file names.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const PLACEHOLDER: &str = "untitled";
const RESERVED_PREFIX: &str = "post_";

/// Build a filesystem-safe page name from a subreddit and a post title.
///
/// A title that cleans down to nothing or to a reserved device name stands
/// on its own (`untitled`, `post_CON`); otherwise the result is
/// `{subreddit}_{title}` cleaned as a whole.
///
/// ```
/// # use reddit_saved_archiver::archiver::sanitize_filename;
/// assert_eq!(sanitize_filename("funny", "  Hello???World!!  "), "funny_HelloWorld");
/// assert_eq!(sanitize_filename("x", "CON"), "post_CON");
/// assert_eq!(sanitize_filename("x", "?!*"), "untitled");
/// ```
#[must_use]
pub fn sanitize_filename(subreddit: &str, title: &str) -> String {
    let title_only = clean(title);
    if title_only.is_empty() {
        return PLACEHOLDER.to_string();
    }
    if is_reserved(&title_only) {
        return format!("{RESERVED_PREFIX}{title_only}");
    }

    let name = clean(&format!("{subreddit}_{title}"));
    if name.is_empty() {
        PLACEHOLDER.to_string()
    } else if is_reserved(&name) {
        format!("{RESERVED_PREFIX}{name}")
    } else {
        name
    }
}

fn clean(raw: &str) -> String {
    // Keep word characters, whitespace and hyphens; whitespace becomes '_'
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    // Collapse runs of '-' and '_' into a single '_'
    let mut collapsed = String::with_capacity(kept.len());
    let mut in_run = false;
    for c in kept.chars() {
        if c == '-' || c == '_' {
            if !in_run {
                collapsed.push('_');
            }
            in_run = true;
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }

    let trimmed = collapsed.trim_matches(['_', '-', '.']);
    let mut truncated: String = trimmed.chars().take(MAX_FILENAME_LENGTH).collect();
    if truncated.len() > MAX_FILENAME_BYTES {
        let mut end = MAX_FILENAME_BYTES;
        while !truncated.is_char_boundary(end) {
            end -= 1;
        }
        truncated.truncate(end);
    }
    truncated.trim_end_matches(['.', ' ']).to_string()
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_symbols() {
        assert_eq!(
            sanitize_filename("funny", "  Hello???World!!  "),
            "funny_HelloWorld"
        );
    }

    #[test]
    fn test_sanitize_collapses_separators() {
        assert_eq!(
            sanitize_filename("rust", "Async -- in   depth: part_2"),
            "rust_Async_in_depth_part_2"
        );
        assert_eq!(sanitize_filename("a", "tab\tand\nnewline"), "a_tab_and_newline");
    }

    #[test]
    fn test_sanitize_reserved_names() {
        assert_eq!(sanitize_filename("x", "CON"), "post_CON");
        assert_eq!(sanitize_filename("x", "lpt1"), "post_lpt1");
        assert_eq!(sanitize_filename("", "nul"), "post_nul");
        assert_eq!(sanitize_filename("x", "CONSOLE"), "x_CONSOLE");
    }

    #[test]
    fn test_sanitize_empty_title() {
        assert_eq!(sanitize_filename("x", "?!*&^%"), "untitled");
        assert_eq!(sanitize_filename("x", ""), "untitled");
        assert_eq!(sanitize_filename("", "!!!"), "untitled");
    }

    #[test]
    fn test_sanitize_truncates() {
        let title = "a".repeat(400);
        let name = sanitize_filename("sub", &title);
        assert_eq!(name.chars().count(), MAX_FILENAME_LENGTH);
        assert!(name.starts_with("sub_aaa"));
    }

    #[test]
    fn test_sanitize_multibyte_title_fits_byte_budget() {
        let name = sanitize_filename("jp", &"日本語".repeat(60));
        assert!(name.len() <= MAX_FILENAME_BYTES, "{} bytes", name.len());
        assert!(name.starts_with("jp_日本語"));
        // Room left for the collision suffix and extension.
        assert!(format!("{name}_abcdefg.html").len() <= 255);

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(format!("{name}_abcdefg.html")), "x").unwrap();
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_filename("日本", "こんにちは 世界"), "日本_こんにちは_世界");
    }
}
