//! Detects whether a cursor sits inside a class-bearing attribute.
//!
//! [`scan`] looks only at the text of the line up to the cursor. It returns
//! `None` when the position is not an attribute context, and otherwise the
//! class tokens already present, which completion must not offer again.

use crate::matcher::{ClassAttributeMatcher, PatternMatcher};
use once_cell::sync::Lazy;
use regex::Regex;

/// `class="...`, `className='...`, `className={"...` up to the cursor.
static DIRECT_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class(?:Name)?=\{?["'`]([\w\-@:/ ]*)$"#).expect("Invalid class attribute regex")
});

/// Anything that looks like a class token.
pub(crate) static CLASS_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\-\w,@\\:\[\]]+").expect("Invalid class token regex"));

const EXPRESSION_OPENER: &str = "className={";

/// Attribute context at `cursor` (a character offset into `line`).
pub fn scan(line: &str, cursor: usize, matcher: &ClassAttributeMatcher) -> Option<Vec<String>> {
    let prefix = line_prefix(line, cursor);
    match matcher {
        ClassAttributeMatcher::Pattern(pattern) => scan_pattern(prefix, pattern),
        ClassAttributeMatcher::MarkupAttribute => scan_markup_attribute(prefix),
    }
}

/// `line` up to the `cursor`-th character.
pub(crate) fn line_prefix(line: &str, cursor: usize) -> &str {
    line.char_indices()
        .nth(cursor)
        .map_or(line, |(byte, _)| &line[..byte])
}

fn scan_pattern(prefix: &str, pattern: &PatternMatcher) -> Option<Vec<String>> {
    let captured = pattern.regex().captures(prefix)?.get(1)?;
    Some(split_tokens(captured.as_str(), pattern.split()))
}

fn split_tokens(raw: &str, delimiter: &str) -> Vec<String> {
    raw.split(delimiter)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn scan_markup_attribute(prefix: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut matched = false;

    if let Some(captured) = DIRECT_ATTRIBUTE_RE.captures(prefix).and_then(|c| c.get(1)) {
        matched = true;
        tokens.extend(split_tokens(captured.as_str(), " "));
    }

    if let Some(expression) = open_string_in_expression(prefix) {
        matched = true;
        for found in CLASS_TOKEN_RE.find_iter(expression) {
            if !tokens.iter().any(|token| token == found.as_str()) {
                tokens.push(found.as_str().to_string());
            }
        }
    }

    matched.then_some(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Brace,
    Interpolation,
    Quote(char),
}

/// Text after the last `className={` when the prefix ends inside a string
/// literal of that expression.
fn open_string_in_expression(prefix: &str) -> Option<&str> {
    let start = prefix.rfind(EXPRESSION_OPENER)? + EXPRESSION_OPENER.len();
    let expression = &prefix[start..];

    let mut stack: Vec<Frame> = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        match stack.last().copied() {
            Some(Frame::Quote(quote)) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    stack.pop();
                } else if quote == '`' && c == '$' && chars.peek() == Some(&'{') {
                    chars.next();
                    stack.push(Frame::Interpolation);
                }
            }
            top => match c {
                // Closes the attribute expression itself.
                '}' if top.is_none() => return None,
                '}' => {
                    stack.pop();
                }
                '{' => stack.push(Frame::Brace),
                '"' | '\'' | '`' => stack.push(Frame::Quote(c)),
                _ => {}
            },
        }
    }

    matches!(stack.last(), Some(Frame::Quote(_))).then_some(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markup(line: &str) -> Option<Vec<String>> {
        scan(line, line.chars().count(), &ClassAttributeMatcher::MarkupAttribute)
    }

    fn tokens(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn pattern_mode_splits_capture() {
        let matcher = ClassAttributeMatcher::pattern(r#"class="([\w ]*)$"#).unwrap();
        let line = r#"<div class="a b "#;
        assert_eq!(scan(line, line.chars().count(), &matcher), tokens(&["a", "b"]));
    }

    #[test]
    fn pattern_mode_without_match() {
        let matcher = ClassAttributeMatcher::markup();
        assert_eq!(scan("<div id=\"x", 10, &matcher), None);
    }

    #[test]
    fn pattern_mode_with_prefix_and_split() {
        let apply = ClassAttributeMatcher::stylesheet_apply();
        let line = "  @apply .btn .rounded-md ";
        assert_eq!(scan(line, line.len(), &apply), tokens(&[".btn", ".rounded-md"]));

        let emmet = ClassAttributeMatcher::emmet();
        assert_eq!(scan("div.card.card--wide", 19, &emmet), tokens(&["card", "card--wide"]));
    }

    #[test]
    fn cursor_limits_the_prefix() {
        let matcher = ClassAttributeMatcher::markup();
        let line = r#"<p class="lead">text</p>"#;
        // Between `lead` and the closing quote.
        assert_eq!(scan(line, 14, &matcher), tokens(&["lead"]));
        // After the attribute closed.
        assert_eq!(scan(line, 16, &matcher), None);
    }

    #[test]
    fn cursor_counts_characters() {
        let matcher = ClassAttributeMatcher::markup();
        let line = "<p title=\"é\" class=\"a b";
        assert_eq!(scan(line, line.chars().count(), &matcher), tokens(&["a", "b"]));
        assert_eq!(scan(line, 500, &matcher), tokens(&["a", "b"]));
    }

    #[test]
    fn direct_rule() {
        assert_eq!(markup(r#"<div className="table__row md:w-1/2 "#), tokens(&["table__row", "md:w-1/2"]));
        assert_eq!(markup("<div class='x"), tokens(&["x"]));
        assert_eq!(markup("<div className={`a "), tokens(&["a"]));
        assert_eq!(markup("<div className={\"\""), None);
        assert_eq!(markup("<div id=\"a"), None);
    }

    #[test]
    fn expression_literal_rule() {
        let line = r#"<div className={"a " + (x ? "b" : "")}>"#;
        // Inside the trailing empty string.
        let cursor = line.find(r#""")}"#).unwrap() + 1;

        let found = scan(line, cursor, &ClassAttributeMatcher::MarkupAttribute).unwrap();
        assert!(found.contains(&"a".to_string()));
        assert!(found.contains(&"b".to_string()));
    }

    #[test]
    fn expression_outside_string_is_not_context() {
        assert_eq!(markup(r#"<div className={"a " + "#), None);
        assert_eq!(markup(r#"<div className={cx("a", { b: true }) "#), None);
        assert_eq!(markup(r#"<div className={"a"}> <span "#), None);
    }

    #[test]
    fn braces_inside_strings_are_literal() {
        assert_eq!(markup(r#"<div className={"}" + " x"#), tokens(&["x"]));
    }

    #[test]
    fn escapes_and_interpolation() {
        assert!(markup(r#"<div className={"say \"hi\" b"#).is_some());
        let found = markup("<div className={`btn ${active ? \"on\" : \"off\"} size-").unwrap();
        assert!(found.contains(&"btn".to_string()));
        assert!(found.contains(&"size-".to_string()));
        // Inside the interpolation, not a string.
        assert_eq!(markup("<div className={`btn ${active "), None);
    }

    #[test]
    fn last_opener_wins() {
        let line = r#"<a className={"x"}></a><b className={"y "#;
        assert_eq!(markup(line), tokens(&["y"]));
    }
}
