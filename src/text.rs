//! Small text helpers shared by the extraction stages.

/// Characters that PDF extraction leaves in front of the first word.
fn is_leading_noise(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{feff}' | '\u{200b}' | ',' | ';' | ':' | '-')
}

/// Strips byte-order marks, zero-width spaces, whitespace and stray
/// punctuation from the start of the text.
pub fn strip_leading_noise(text: &str) -> &str {
    text.trim_start_matches(is_leading_noise)
}

/// Collapses every whitespace run (newlines included) into a single space
/// and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns `true` if `c` may continue a word, so a phrase ending right
/// before it is not a whole-word match.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive prefix test that returns the remainder of `text` after
/// the prefix, keeping the original casing of the remainder.
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut text_chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = text_chars.next()?;
        if !chars_eq_ignore_case(actual, expected) {
            return None;
        }
    }
    match text_chars.next() {
        Some((idx, _)) => Some(&text[idx..]),
        None => Some(""),
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
