//! Line-based configuration sources
//!
//! One `key <separator> value` pair per line. This module only splits lines;
//! the value grammar itself (quotes, comments, escapes, references) is the
//! tokenizer's job, applied when the store assigns each pair.

/// Result of loading one source file into a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file could not be stat'd (typically: does not exist)
    Missing,
    /// The file's modification time has not advanced; nothing re-read
    Unchanged,
    /// The file was parsed into the store
    Loaded,
}

/// Split file content into key/value pairs
///
/// Lines without a separator are skipped, as are whole-line comments (first
/// non-whitespace text starts with a marker). Keys are trimmed; values lose
/// leading whitespace here and trailing whitespace in `Store::set`.
pub(crate) fn parse_lines(
    content: &str,
    markers: &[String],
    separators: &[char],
) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        if is_comment_line(line, markers) {
            continue;
        }
        if let Some((key, value)) = split_line(line, separators) {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    pairs
}

/// Split one line at the first separator character
pub(crate) fn split_line<'a>(line: &'a str, separators: &[char]) -> Option<(&'a str, &'a str)> {
    let index = line.find(separators)?;
    let key = line[..index].trim();
    if key.is_empty() {
        return None;
    }
    // Separators are single characters
    let sep_len = line[index..].chars().next().map_or(1, char::len_utf8);
    let value = line[index + sep_len..].trim_start();
    Some((key, value))
}

/// True if the line's first non-whitespace text opens a comment
pub(crate) fn is_comment_line(line: &str, markers: &[String]) -> bool {
    let trimmed = line.trim_start();
    markers.iter().any(|m| trimmed.starts_with(m.as_str()))
}
