//! Stylesheet syntax tree consumed by the class extractor.
//!
//! The tree is deliberately shallow: rules, comments, block at-rules (groups)
//! and everything else. It is built from tree-sitter-css output, but can also
//! be assembled by hand, which is how the extractor is unit tested.

use crate::error::{ExtractorError, Result};
use crate::language::Language;
use tree_sitter::Node;

/// One-based line/column pair. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePoint {
    pub line: u32,
    pub column: u32,
}

impl SourcePoint {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Start and end of a node, one-based. The end column points one past the
/// last character of the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodePosition {
    pub start: Option<SourcePoint>,
    pub end: Option<SourcePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleNode {
    Rule(StyleRule),
    Comment(StyleComment),
    Group(StyleGroup),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub position: NodePosition,
}

/// Raw comment body between `/*` and `*/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleComment {
    pub text: String,
}

/// Block at-rule such as `@media` or `@layer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleGroup {
    pub name: String,
    pub nodes: Vec<StyleNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<StyleNode>,
}

/// Offset of a stylesheet inside a larger document, e.g. a `<style>` body
/// inside its markup file. Both fields are zero-based; `column` only applies
/// to the first line of the embedded text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOrigin {
    pub line: u32,
    pub column: u32,
}

impl StyleNode {
    pub fn rule<S: Into<String>>(
        selectors: impl IntoIterator<Item = S>,
        position: NodePosition,
    ) -> Self {
        Self::Rule(StyleRule {
            selectors: selectors.into_iter().map(Into::into).collect(),
            position,
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(StyleComment { text: text.into() })
    }

    pub fn group(name: impl Into<String>, nodes: Vec<StyleNode>) -> Self {
        Self::Group(StyleGroup {
            name: name.into(),
            nodes,
        })
    }
}

/// Parse CSS text into a [`Stylesheet`].
pub fn parse_stylesheet(text: &str) -> Result<Stylesheet> {
    parse_stylesheet_at(text, TextOrigin::default())
}

/// Parse CSS text that starts at `origin` inside its host document.
pub fn parse_stylesheet_at(text: &str, origin: TextOrigin) -> Result<Stylesheet> {
    let mut parser = Language::Css.parser()?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| ExtractorError::parse("stylesheet"))?;

    let builder = TreeBuilder {
        source: text,
        origin,
    };
    Ok(Stylesheet {
        nodes: builder.build_nodes(tree.root_node()),
    })
}

struct TreeBuilder<'a> {
    source: &'a str,
    origin: TextOrigin,
}

impl TreeBuilder<'_> {
    /// Convert the children of `parent` into style nodes. `ERROR` nodes are
    /// flattened so that their recoverable content stays visible as siblings.
    fn build_nodes(&self, parent: Node) -> Vec<StyleNode> {
        let mut children = Vec::new();
        flatten_children(parent, &mut children);

        let mut nodes = Vec::new();
        // Start of selector text that tree-sitter could not attach to a rule.
        let mut pending_start: Option<Node> = None;

        for child in children {
            match child.kind() {
                "rule_set" => {
                    nodes.push(self.build_rule(pending_start.take().unwrap_or(child), child));
                }
                "comment" => nodes.push(self.build_comment(child)),
                "block" => {
                    // A block whose selector ended up inside an ERROR node.
                    match pending_start.take() {
                        Some(start) => nodes.push(self.build_loose_rule(start, child)),
                        None => nodes.push(StyleNode::Other),
                    }
                }
                "media_statement" | "supports_statement" | "at_rule" => {
                    pending_start = None;
                    nodes.push(self.build_group_or_other(child));
                }
                "{" | "}" | ";" => pending_start = None,
                kind if is_statement(kind) => {
                    pending_start = None;
                    nodes.push(StyleNode::Other);
                }
                _ => {
                    pending_start.get_or_insert(child);
                }
            }
        }

        nodes
    }

    fn build_rule(&self, start: Node, rule: Node) -> StyleNode {
        let block_start = child_of_kind(rule, "block").map_or(rule.end_byte(), |b| b.start_byte());
        let selector_text = &self.source[start.start_byte()..block_start];
        StyleNode::Rule(StyleRule {
            selectors: split_selectors(selector_text),
            position: NodePosition {
                start: Some(self.start_point(start)),
                end: Some(self.end_point(rule)),
            },
        })
    }

    fn build_loose_rule(&self, start: Node, block: Node) -> StyleNode {
        let selector_text = &self.source[start.start_byte()..block.start_byte()];
        StyleNode::Rule(StyleRule {
            selectors: split_selectors(selector_text),
            position: NodePosition {
                start: Some(self.start_point(start)),
                end: Some(self.end_point(block)),
            },
        })
    }

    fn build_comment(&self, node: Node) -> StyleNode {
        let raw = &self.source[node.byte_range()];
        let body = raw.strip_prefix("/*").unwrap_or(raw);
        let body = body.strip_suffix("*/").unwrap_or(body);
        StyleNode::comment(body)
    }

    fn build_group_or_other(&self, node: Node) -> StyleNode {
        let Some(block) = child_of_kind(node, "block") else {
            return StyleNode::Other;
        };

        let name = match node.kind() {
            "media_statement" => "media".to_string(),
            "supports_statement" => "supports".to_string(),
            _ => child_of_kind(node, "at_keyword")
                .map(|keyword| self.source[keyword.byte_range()].trim_start_matches('@').to_string())
                .unwrap_or_default(),
        };

        StyleNode::Group(StyleGroup {
            name,
            nodes: self.build_nodes(block),
        })
    }

    fn start_point(&self, node: Node) -> SourcePoint {
        let (line, column) = self.char_point(node.start_byte(), node.start_position());
        SourcePoint::new(line + 1, column + 1)
    }

    fn end_point(&self, node: Node) -> SourcePoint {
        let (line, column) = self.char_point(node.end_byte(), node.end_position());
        SourcePoint::new(line + 1, column + 1)
    }

    /// Zero-based line and character column, shifted by the origin.
    fn char_point(&self, byte: usize, point: tree_sitter::Point) -> (u32, u32) {
        let row = point.row as u32;
        let column = char_column(self.source, byte, point.column) as u32;
        if row == 0 {
            (self.origin.line, self.origin.column + column)
        } else {
            (self.origin.line + row, column)
        }
    }
}

/// Character column of `byte`, given its byte column within the line.
pub(crate) fn char_column(source: &str, byte: usize, byte_column: usize) -> usize {
    let line_start = byte.saturating_sub(byte_column);
    source
        .get(line_start..byte)
        .map_or(byte_column, |prefix| prefix.chars().count())
}

fn flatten_children<'t>(parent: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = parent.walk();
    for child in parent.children(&mut cursor) {
        if child.is_error() && child.child_count() > 0 {
            flatten_children(child, out);
        } else {
            out.push(child);
        }
    }
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn is_statement(kind: &str) -> bool {
    kind.ends_with("_statement") || kind == "declaration"
}

/// Split selector text at top-level commas. Commas inside parentheses,
/// brackets, strings or after a backslash do not separate selectors.
pub fn split_selectors(text: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(c),
            '(' | '[' if quote.is_none() => depth += 1,
            ')' | ']' if quote.is_none() => depth = depth.saturating_sub(1),
            ',' if quote.is_none() && depth == 0 => {
                push_selector(&mut selectors, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_selector(&mut selectors, &current);

    selectors
}

fn push_selector(selectors: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        selectors.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(nodes: &[StyleNode]) -> Vec<&StyleRule> {
        nodes
            .iter()
            .filter_map(|node| match node {
                StyleNode::Rule(rule) => Some(rule),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splits_selectors_at_top_level_commas() {
        assert_eq!(
            split_selectors(".a, .b:is(.c, .d) , [data-x=\"1,2\"], .e\\,f"),
            vec![".a", ".b:is(.c, .d)", "[data-x=\"1,2\"]", ".e\\,f"]
        );
        assert!(split_selectors("  ").is_empty());
    }

    #[test]
    fn parses_rules_and_comments() {
        let sheet = parse_stylesheet("/** Button */\n.btn, .btn-primary { color: red; }\n").unwrap();

        assert_eq!(sheet.nodes.len(), 2);
        assert_eq!(sheet.nodes[0], StyleNode::comment("* Button "));
        let rule = rules(&sheet.nodes)[0];
        assert_eq!(rule.selectors, vec![".btn", ".btn-primary"]);
        assert_eq!(rule.position.start, Some(SourcePoint::new(2, 1)));
        assert_eq!(rule.position.end, Some(SourcePoint::new(2, 35)));
    }

    #[test]
    fn media_block_becomes_group() {
        let css = "@media (min-width: 600px) {\n  .wide { width: 100%; }\n}\n";
        let sheet = parse_stylesheet(css).unwrap();

        let StyleNode::Group(group) = &sheet.nodes[0] else {
            panic!("expected group, got {:?}", sheet.nodes[0]);
        };
        assert_eq!(group.name, "media");
        let inner = rules(&group.nodes);
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].selectors, vec![".wide"]);
        assert_eq!(inner[0].position.start, Some(SourcePoint::new(2, 3)));
    }

    #[test]
    fn import_is_other() {
        let sheet = parse_stylesheet("@import url(\"a.css\");\n.x {}\n").unwrap();
        assert_eq!(sheet.nodes[0], StyleNode::Other);
        assert_eq!(rules(&sheet.nodes)[0].selectors, vec![".x"]);
    }

    #[test]
    fn origin_shifts_positions() {
        let origin = TextOrigin { line: 4, column: 7 };
        let sheet = parse_stylesheet_at(".a{}\n.b{}", origin).unwrap();
        let found = rules(&sheet.nodes);

        assert_eq!(found[0].position.start, Some(SourcePoint::new(5, 8)));
        assert_eq!(found[1].position.start, Some(SourcePoint::new(6, 1)));
    }

    #[test]
    fn comment_text_is_raw() {
        let sheet = parse_stylesheet("/*  * not doc */\n/*\n * doc\n */\n.a{}").unwrap();
        assert_eq!(sheet.nodes[0], StyleNode::comment("  * not doc "));
        assert_eq!(sheet.nodes[1], StyleNode::comment("\n * doc\n "));
    }

    #[test]
    fn end_points_past_last_character() {
        let sheet = parse_stylesheet(".a{}").unwrap();
        let rule = rules(&sheet.nodes)[0];
        assert_eq!(rule.position.start, Some(SourcePoint::new(1, 1)));
        assert_eq!(rule.position.end, Some(SourcePoint::new(1, 5)));
    }

    #[test]
    fn columns_count_characters() {
        let sheet = parse_stylesheet("/* é */ .b {}").unwrap();
        let rule = rules(&sheet.nodes)[0];
        assert_eq!(rule.position.start, Some(SourcePoint::new(1, 9)));
    }
}
