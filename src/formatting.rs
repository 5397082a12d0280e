//! Post text formatting: length budget plus topical hashtags.
//!
//! This is an optional decorator over an item's text. It is pure and has no
//! knowledge of fetching or posting.

use crate::utils::truncate_with_ellipsis;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Tags appended to every post.
const BASELINE_TAGS: [&str; 2] = ["#Business", "#News"];

/// Keyword patterns and the tags they contribute, in insertion order.
static KEYWORD_TAGS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)ai|artificial intelligence").unwrap(),
            &["#AI", "#ArtificialIntelligence"][..],
        ),
        (Regex::new(r"(?i)startup").unwrap(), &["#Startup"][..]),
        (
            Regex::new(r"(?i)funding|invest|venture").unwrap(),
            &["#Funding", "#VentureCapital"][..],
        ),
        (Regex::new(r"(?i)tech").unwrap(), &["#Tech"][..]),
    ]
});

/// Topical hashtags for `text`.
///
/// Deduplicated, sorted by ascending length; equal lengths keep the order in
/// which the tags were first produced.
pub fn hashtags(text: &str) -> Vec<&'static str> {
    let mut tags: Vec<&'static str> = KEYWORD_TAGS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .flat_map(|(_, tags)| tags.iter().copied())
        .chain(BASELINE_TAGS)
        .unique()
        .collect();
    tags.sort_by_key(|t| t.chars().count());
    tags
}

/// Format `text` for posting within a budget of `max_len` characters.
///
/// The tag suffix is reserved out of the budget; the text is cut with an
/// ellipsis to fit what is left. When the budget cannot even hold the suffix,
/// the tags are dropped.
///
/// # Arguments
///
/// * `text` - Raw headline or summary
/// * `max_len` - Character budget for the whole result
///
/// # Returns
///
/// `"<text>\n\n<tags>"`, at most `max_len` characters long when `max_len > 3`.
///
/// # Examples
///
/// ```ignore
/// let post = format_content("Startup hires 50", 270);
/// assert_eq!(post, "Startup hires 50\n\n#News #Startup #Business");
/// ```
pub fn format_content(text: &str, max_len: usize) -> String {
    let suffix = format!("\n\n{}", hashtags(text).join(" "));
    let suffix_len = suffix.chars().count();

    if max_len >= suffix_len + 4 {
        let mut out = truncate_with_ellipsis(text, max_len - suffix_len);
        out.push_str(&suffix);
        out
    } else {
        truncate_with_ellipsis(text, max_len)
    }
}
