use crate::attribute::{line_prefix, scan, CLASS_TOKEN_RE};
use crate::matcher::ClassAttributeMatcher;
use classmap_extractor::Location;
use classmap_indexer::ClassIndex;

/// Class-like word touching `cursor` (a character offset into `line`).
pub fn word_at(line: &str, cursor: usize) -> Option<&str> {
    let cursor_byte = line_prefix(line, cursor).len();
    CLASS_TOKEN_RE
        .find_iter(line)
        .find(|found| found.start() <= cursor_byte && cursor_byte <= found.end())
        .map(|found| found.as_str())
}

/// Where the class under the cursor is defined.
///
/// `None` when no matcher recognizes the context, the word is not indexed,
/// or its definition carries no location.
pub fn find_definition<'a>(
    index: &'a ClassIndex,
    line: &str,
    cursor: usize,
    matchers: &[ClassAttributeMatcher],
) -> Option<&'a Location> {
    if !matchers
        .iter()
        .any(|matcher| scan(line, cursor, matcher).is_some())
    {
        return None;
    }

    let word = word_at(line, cursor)?;
    log::debug!("Looking up definition of {word}");
    index.get(word)?.location.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmap_extractor::{ClassDefinition, Position, Range, SourceRef};
    use pretty_assertions::assert_eq;

    fn located(name: &str, line: u32) -> ClassDefinition {
        ClassDefinition {
            location: Some(Location {
                source: SourceRef::File("styles/site.css".into()),
                range: Range {
                    start: Position::new(line, 0),
                    end: Position::new(line + 2, 1),
                },
            }),
            ..ClassDefinition::new(name)
        }
    }

    #[test]
    fn word_at_cursor_edges() {
        let line = r#"<a class="nav md:hidden">"#;
        assert_eq!(word_at(line, 10), Some("nav"));
        assert_eq!(word_at(line, 13), Some("nav"));
        assert_eq!(word_at(line, 16), Some("md:hidden"));
        assert_eq!(word_at("   ", 1), None);
    }

    #[test]
    fn finds_location_inside_attribute() {
        let index = ClassIndex::from_definitions([located("nav", 4)]);
        let line = r#"<a class="nav">"#;
        let location = find_definition(&index, line, 12, &[ClassAttributeMatcher::markup()]).unwrap();
        assert_eq!(location.range.start, Position::new(4, 0));
    }

    #[test]
    fn nothing_without_location_or_context() {
        let index = ClassIndex::from_definitions([ClassDefinition::new("nav"), located("bar", 1)]);
        let matchers = [ClassAttributeMatcher::markup()];
        assert_eq!(find_definition(&index, r#"<a class="nav"#, 12, &matchers), None);
        // `bar` is indexed but the cursor is not in a class attribute.
        assert_eq!(find_definition(&index, "<a id=\"bar", 9, &matchers), None);
        assert_eq!(find_definition(&index, r#"<a class="missing"#, 12, &matchers), None);
    }
}
