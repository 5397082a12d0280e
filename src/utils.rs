//! Small string helpers for formatting, publishing, logging and console output.

/// Cap `s` at `max` characters, replacing the tail with `"..."` when it is too long.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-character.
/// For `max <= 3` there is no room for an ellipsis and the text is cut hard.
///
/// # Arguments
///
/// * `s` - The text to cap
/// * `max` - Maximum length of the result, ellipsis included
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
/// assert_eq!(truncate_with_ellipsis("short", 280), "short");
/// ```
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Keep the first `keep` characters of `s`, appending `"..."` when anything was cut.
///
/// Unlike [`truncate_with_ellipsis`] the ellipsis goes on top of `keep`, so
/// the result can be up to `keep + 3` characters long.
///
/// # Arguments
///
/// * `s` - The text to clip
/// * `keep` - Characters kept before the ellipsis
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clip_with_ellipsis("abcdef", 3), "abc...");
/// assert_eq!(clip_with_ellipsis("abc", 3), "abc");
/// ```
pub fn clip_with_ellipsis(s: &str, keep: usize) -> String {
    if s.chars().count() <= keep {
        return s.to_string();
    }
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters and `"…(+N chars)"` is appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("abcdef", 3), "abc…(+3 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Turn a plural label into a singular heading: `"summaries"` -> `"Summary"`.
pub fn singular_title(label: &str) -> String {
    let singular = match label.strip_suffix("ies") {
        Some(stem) => format!("{}y", stem),
        None => label.strip_suffix('s').unwrap_or(label).to_string(),
    };
    upcase(&singular)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis_short_string() {
        assert_eq!(truncate_with_ellipsis("short", 280), "short");
        assert_eq!(truncate_with_ellipsis("exactly", 7), "exactly");
    }

    #[test]
    fn test_truncate_with_ellipsis_long_string() {
        assert_eq!(truncate_with_ellipsis("hello world", 8), "hello...");
        let long = "a".repeat(300);
        let capped = truncate_with_ellipsis(&long, 280);
        assert_eq!(capped.chars().count(), 280);
        assert!(capped.ends_with("..."));
    }

    #[test]
    fn test_truncate_with_ellipsis_counts_chars() {
        let s = "é".repeat(10);
        assert_eq!(truncate_with_ellipsis(&s, 5), "éé...");
    }

    #[test]
    fn test_truncate_with_ellipsis_tiny_limit() {
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
    }

    #[test]
    fn test_clip_with_ellipsis() {
        assert_eq!(clip_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(clip_with_ellipsis("abc", 3), "abc");
        assert_eq!(clip_with_ellipsis("ééééé", 4), "éééé...");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("hello"), "Hello");
        assert_eq!(upcase(""), "");
        assert_eq!(upcase("a"), "A");
    }

    #[test]
    fn test_singular_title() {
        assert_eq!(singular_title("headlines"), "Headline");
        assert_eq!(singular_title("summaries"), "Summary");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }
}
