//! Value tokenization
//!
//! Splits a raw value string into the fragment sequence stored under a key:
//! quoted spans are located first, the gaps around them are each checked for
//! an in-line comment, and (in the interpolating grammar) unquoted and
//! double-quoted spans are further split on `$name` / `${...}` references.
//!
//! Tokenization never fails: any input reduces to a well-defined fragment
//! sequence, with an unterminated quote degrading to literal text.

use crate::escape::{self, unescape, BASE_ESCAPES, INTERP_ESCAPES};
use crate::value::{Fragment, StoredValue};

/// Quote characters recognized by the value grammar
pub const QUOTES: &[char] = &['\'', '"'];

/// The value grammar in effect for a store
#[derive(Debug, Clone, PartialEq)]
pub struct Dialect {
    /// In-line comment markers, honored outside quotes when unescaped
    pub comment_markers: Vec<String>,
    /// Characters unconditionally unescaped by `\`
    pub escapes: Vec<char>,
    /// Whether variable references are recognized
    pub interpolate: bool,
}

impl Dialect {
    /// Literal grammar: quoting, escaping, and comments only
    pub fn literal() -> Self {
        Self {
            comment_markers: vec!["#".into(), "//".into()],
            escapes: BASE_ESCAPES.to_vec(),
            interpolate: false,
        }
    }

    /// Interpolating grammar: additionally recognizes `$name` / `${...}`
    pub fn interpolating() -> Self {
        Self {
            comment_markers: vec!["#".into(), "//".into()],
            escapes: INTERP_ESCAPES.to_vec(),
            interpolate: true,
        }
    }

    /// INI flavor: `;` starts a comment and is escapable
    pub fn ini(mut self) -> Self {
        if !self.comment_markers.iter().any(|m| m == ";") {
            self.comment_markers.push(";".into());
        }
        if !self.escapes.contains(&';') {
            self.escapes.push(';');
        }
        self
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::literal()
    }
}

/// A quoted span located in the raw value
struct QuotedSpan {
    /// Byte index of the opening quote
    open: usize,
    /// Byte range of the content between the quotes
    content: std::ops::Range<usize>,
    /// Byte index just past the closing quote
    end: usize,
    /// The quote character
    quote: char,
}

/// Tokenize a raw value string under the given dialect
pub fn tokenize(value: &str, dialect: &Dialect) -> StoredValue {
    let mut fragments = Vec::new();
    let mut prev = 0;

    while let Some(span) = find_quoted(value, prev) {
        let gap = &value[prev..span.open];
        if let Some(cut) = comment_at(gap, &dialect.comment_markers) {
            // A comment in a gap discards the rest of the value, later
            // quotes included.
            push_span(&mut fragments, &gap[..cut], None, dialect);
            return StoredValue::new(fragments);
        }
        push_span(&mut fragments, gap, None, dialect);
        push_span(
            &mut fragments,
            &value[span.content.clone()],
            Some(span.quote),
            dialect,
        );
        prev = span.end;
    }

    // Everything after the last quoted span, an unterminated quote included.
    let tail = &value[prev..];
    let cut = comment_at(tail, &dialect.comment_markers).unwrap_or(tail.len());
    push_span(&mut fragments, &tail[..cut], None, dialect);

    StoredValue::new(fragments)
}

/// Find the first complete quoted span at or after byte `from`
///
/// An opening quote with no matching unescaped close is skipped, so a later
/// pair can still form a span; the lone quote stays in the surrounding text.
fn find_quoted(value: &str, from: usize) -> Option<QuotedSpan> {
    let mut search = from;
    while let Some(offset) = value[search..].find(QUOTES) {
        let open = search + offset;
        if escape::is_escaped(value, open) {
            search = open + 1;
            continue;
        }
        let quote = value[open..].chars().next().unwrap_or('\'');

        // Closing quote must be the same character, unescaped.
        let mut close_from = open + 1;
        while let Some(close_offset) = value[close_from..].find(quote) {
            let close = close_from + close_offset;
            if escape::is_escaped(value, close) {
                close_from = close + 1;
                continue;
            }
            return Some(QuotedSpan {
                open,
                content: open + 1..close,
                end: close + 1,
                quote,
            });
        }
        search = open + 1;
    }
    None
}

/// Position where an unquoted span should be cut for a comment
///
/// Returns the byte index of the cut: the start of the whitespace run
/// immediately preceding the first unescaped marker, or `None` when the span
/// has no comment.
fn comment_at(span: &str, markers: &[String]) -> Option<usize> {
    let mut earliest: Option<usize> = None;

    for marker in markers {
        let mut from = 0;
        while let Some(offset) = span[from..].find(marker.as_str()) {
            let index = from + offset;
            if escape::is_escaped(span, index) {
                from = index + 1;
                continue;
            }
            if earliest.map_or(true, |e| index < e) {
                earliest = Some(index);
            }
            break;
        }
    }

    earliest.map(|index| span[..index].trim_end().len())
}

/// A variable reference located in a span
struct VariableMatch<'a> {
    /// Byte index of the `$`
    start: usize,
    /// Byte index just past the reference
    end: usize,
    /// Raw (still escaped) name or braced expression
    name: &'a str,
}

/// Find the first variable reference at or after byte `from`
///
/// Bare form: `$` followed by one or more word characters. Braced form: `${`
/// followed by non-empty text up to the first unescaped `}`. An escaped `$`
/// never opens a reference, and a `$` followed by neither form is literal.
fn find_variable(span: &str, from: usize) -> Option<VariableMatch<'_>> {
    let mut search = from;
    while let Some(offset) = span[search..].find('$') {
        let start = search + offset;
        search = start + 1;
        if escape::is_escaped(span, start) {
            continue;
        }

        let rest = &span[start + 1..];
        let word_len: usize = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        if word_len > 0 {
            return Some(VariableMatch {
                start,
                end: start + 1 + word_len,
                name: &rest[..word_len],
            });
        }

        if rest.starts_with('{') {
            let body_start = start + 2;
            let mut close_from = body_start;
            while let Some(close_offset) = span[close_from..].find('}') {
                let close = close_from + close_offset;
                // Content must be non-empty; an immediate `}` becomes content
                // for a later close instead.
                if !escape::is_escaped(span, close) && close > body_start {
                    return Some(VariableMatch {
                        start,
                        end: close + 1,
                        name: &span[body_start..close],
                    });
                }
                close_from = close + 1;
            }
        }
    }
    None
}

/// Hand one span (quoted content or unquoted gap text) to the fragment list
///
/// Single-quoted spans are inert: never scanned for variables.
fn push_span(fragments: &mut Vec<Fragment>, span: &str, quote: Option<char>, dialect: &Dialect) {
    if span.is_empty() {
        return;
    }

    if !dialect.interpolate || quote == Some('\'') {
        fragments.push(Fragment::Literal(unescape(span, &dialect.escapes)));
        return;
    }

    let mut prev = 0;
    while let Some(var) = find_variable(span, prev) {
        if var.start > prev {
            fragments.push(Fragment::Literal(unescape(
                &span[prev..var.start],
                &dialect.escapes,
            )));
        }
        fragments.push(Fragment::VariableReference(unescape(
            var.name,
            &dialect.escapes,
        )));
        prev = var.end;
    }
    if prev < span.len() {
        fragments.push(Fragment::Literal(unescape(&span[prev..], &dialect.escapes)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn literal_join(value: &StoredValue) -> String {
        value.literal_text()
    }

    fn frags(value: &str, dialect: &Dialect) -> Vec<Fragment> {
        tokenize(value, dialect).fragments().to_vec()
    }

    #[test]
    fn test_plain_value_is_one_literal() {
        let dialect = Dialect::literal();
        assert_eq!(
            frags("simple value", &dialect),
            vec![Fragment::Literal("simple value".into())]
        );
    }

    #[test]
    fn test_quote_stripping() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"simple 'quoted' "value""#, &dialect);
        assert_eq!(literal_join(&value), "simple quoted value");
    }

    #[test]
    fn test_interleaved_quotes() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"interleaved: 'a"'"'b""#, &dialect);
        assert_eq!(literal_join(&value), r#"interleaved: a"'b"#);
    }

    #[test]
    fn test_escaped_quote_inside_quotes() {
        let dialect = Dialect::literal();
        let value = tokenize(r#""\"''""#, &dialect);
        assert_eq!(literal_join(&value), r#""''"#);
    }

    #[test]
    fn test_comment_truncation() {
        let dialect = Dialect::literal();
        let value = tokenize("bar # comment", &dialect);
        assert_eq!(literal_join(&value), "bar");
    }

    #[test]
    fn test_double_slash_comment() {
        let dialect = Dialect::literal();
        let value = tokenize("bar // comment", &dialect);
        assert_eq!(literal_join(&value), "bar");
    }

    #[test]
    fn test_escaped_marker_is_literal() {
        let dialect = Dialect::literal();
        assert_eq!(literal_join(&tokenize(r"bar \# baz", &dialect)), "bar # baz");
        assert_eq!(literal_join(&tokenize(r"a \/\/ b", &dialect)), "a // b");
    }

    #[test]
    fn test_marker_after_escaped_backslash_is_a_comment() {
        // \\# is a literal backslash followed by a real comment
        let dialect = Dialect::literal();
        assert_eq!(literal_join(&tokenize(r"bar\\# comment", &dialect)), r"bar\");
    }

    #[test]
    fn test_comment_inside_quotes_is_literal() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"'a # b' c"#, &dialect);
        assert_eq!(literal_join(&value), "a # b c");
    }

    #[test]
    fn test_comment_in_gap_discards_later_quotes() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"foo # 'bar'"#, &dialect);
        assert_eq!(literal_join(&value), "foo");
    }

    #[test]
    fn test_marker_inside_later_quote_is_protected() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"a "b" c 'd # e' f"#, &dialect);
        assert_eq!(literal_join(&value), "a b c d # e f");
    }

    #[test]
    fn test_unterminated_quote_degrades_to_literal() {
        let dialect = Dialect::literal();
        assert_eq!(literal_join(&tokenize("it's fine", &dialect)), "it's fine");
        // the tail after the lone quote is still comment-scanned
        assert_eq!(literal_join(&tokenize("a 'b # c", &dialect)), "a 'b");
    }

    #[test]
    fn test_unterminated_quote_before_a_complete_pair() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"a' b "c" d"#, &dialect);
        assert_eq!(literal_join(&value), "a' b c d");
    }

    #[test]
    fn test_empty_value() {
        let dialect = Dialect::literal();
        assert!(tokenize("", &dialect).fragments().is_empty());
    }

    #[test]
    fn test_base_escapes_applied() {
        let dialect = Dialect::literal();
        let value = tokenize(r#"\r\n\0\"\$"#, &dialect);
        assert_eq!(literal_join(&value), r#"\r\n\0"\$"#);
    }

    #[test]
    fn test_interp_escapes_applied() {
        let dialect = Dialect::interpolating();
        let value = tokenize(r#"\r\n\0\"\$"#, &dialect);
        assert_eq!(literal_join(&value), r#"\r\n\0"$"#);
        assert!(!value.has_references());
    }

    #[test]
    fn test_bare_variable() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("$a", &dialect),
            vec![Fragment::VariableReference("a".into())]
        );
    }

    #[test]
    fn test_variable_with_surrounding_text() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("pre $a post", &dialect),
            vec![
                Fragment::Literal("pre ".into()),
                Fragment::VariableReference("a".into()),
                Fragment::Literal(" post".into()),
            ]
        );
    }

    #[test]
    fn test_bare_variable_stops_at_non_word() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("$a.b", &dialect),
            vec![
                Fragment::VariableReference("a".into()),
                Fragment::Literal(".b".into()),
            ]
        );
    }

    #[test]
    fn test_braced_variable_takes_arbitrary_text() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("${a.b}", &dialect),
            vec![Fragment::VariableReference("a.b".into())]
        );
        assert_eq!(
            frags("${a b}", &dialect),
            vec![Fragment::VariableReference("a b".into())]
        );
    }

    #[test]
    fn test_braced_variable_ends_at_first_unescaped_brace() {
        let dialect = Dialect::interpolating();
        // content is `{a`, the trailing `}` is literal
        assert_eq!(
            frags("${{a}}", &dialect),
            vec![
                Fragment::VariableReference("{a".into()),
                Fragment::Literal("}".into()),
            ]
        );
        // escaped closing brace stays inside the name
        assert_eq!(
            frags(r"${{a\}}", &dialect),
            vec![Fragment::VariableReference("{a}".into())]
        );
        assert_eq!(
            frags(r"${\{a\}}", &dialect),
            vec![Fragment::VariableReference("{a}".into())]
        );
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags(r"\$a=$a", &dialect),
            vec![
                Fragment::Literal("$a=".into()),
                Fragment::VariableReference("a".into()),
            ]
        );
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("a $ b", &dialect),
            vec![Fragment::Literal("a $ b".into())]
        );
        assert_eq!(frags("${}", &dialect), vec![Fragment::Literal("${}".into())]);
    }

    #[test]
    fn test_unicode_variable_name() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags("$größe x", &dialect),
            vec![
                Fragment::VariableReference("größe".into()),
                Fragment::Literal(" x".into()),
            ]
        );
    }

    #[test]
    fn test_single_quotes_are_inert() {
        let dialect = Dialect::interpolating();
        assert_eq!(
            frags(r#""[$a]" '[$a]'"#, &dialect),
            vec![
                Fragment::Literal("[".into()),
                Fragment::VariableReference("a".into()),
                Fragment::Literal("]".into()),
                Fragment::Literal(" ".into()),
                Fragment::Literal("[$a]".into()),
            ]
        );
    }

    #[test]
    fn test_ini_dialect_semicolon_comment() {
        let dialect = Dialect::literal().ini();
        assert_eq!(literal_join(&tokenize("value ; comment", &dialect)), "value");
        assert_eq!(literal_join(&tokenize(r"a\;b", &dialect)), "a;b");
    }

    #[test]
    fn test_round_trip_literal_property() {
        // No quotes, comments, or variable syntax: tokenize is the identity
        let dialect = Dialect::interpolating();
        for input in ["x y", "10.24", "a=b=c", "  leading kept"] {
            assert_eq!(literal_join(&tokenize(input, &dialect)), input);
        }
    }
}
