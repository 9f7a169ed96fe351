//! Backslash escape processing
//!
//! Escaping is non-recursive and only unescapes a fixed character table: a
//! `\` followed by a listed character reduces to the bare character, anything
//! else passes through untouched (the backslash included). There is no error
//! path.

/// Characters unconditionally unescaped by the literal (non-interpolating) grammar
pub const BASE_ESCAPES: &[char] = &['\\', '\'', '"', '#', '/'];

/// Characters unconditionally unescaped by the interpolating grammar
pub const INTERP_ESCAPES: &[char] = &['\\', '\'', '"', '#', '/', '$', '{', '}'];

/// Remove escape prefixes for characters in `escaped`
///
/// `\\` consumes exactly two characters and yields one literal backslash;
/// scanning resumes after it, so the survivor cannot re-trigger unescaping of
/// what follows.
pub fn unescape(input: &str, escaped: &[char]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.clone().next() {
            Some(next) if escaped.contains(&next) => {
                out.push(next);
                chars.next();
            }
            // Unrecognized escape, or trailing backslash: keep the backslash
            _ => out.push('\\'),
        }
    }

    out
}

/// Check whether the character starting at byte `index` is escaped
///
/// A character is escaped when the run of consecutive backslashes immediately
/// before it has odd length; an even run is fully self-escaped and leaves the
/// character bare. Backslash is ASCII, so byte scanning is UTF-8 safe.
pub(crate) fn is_escaped(input: &str, index: usize) -> bool {
    let bytes = input.as_bytes();
    let mut run = 0;
    while run < index && bytes[index - run - 1] == b'\\' {
        run += 1;
    }
    run % 2 == 1
}
