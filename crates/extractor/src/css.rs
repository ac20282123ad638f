use crate::definition::{ClassDefinition, Location, Position, Range, SourceRef};
use crate::stylesheet::{NodePosition, SourcePoint, StyleNode, StyleRule, Stylesheet};
use once_cell::sync::Lazy;
use regex::Regex;

/// A dot followed by word characters, hyphens or backslash escapes.
static CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.]((?:[\-\w]|\\.)+)").expect("Invalid class name regex"));

/// Class names referenced by a single selector, escapes resolved.
pub fn class_names(selector: &str) -> Vec<String> {
    CLASS_NAME_RE
        .captures_iter(selector)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace('\\', ""))
        .collect()
}

/// Extract class definitions from a stylesheet.
///
/// Top-level rules and rules nested one level inside a group (`@media`,
/// `@layer`, ...) are visited. Deeper nesting is ignored.
pub fn extract_class_definitions(
    sheet: &Stylesheet,
    source: Option<&SourceRef>,
) -> Vec<ClassDefinition> {
    let mut definitions = Vec::new();

    for (index, node) in sheet.nodes.iter().enumerate() {
        match node {
            StyleNode::Rule(rule) => {
                let comments = collect_doc_comments(&sheet.nodes, index);
                add_rule(rule, comments, source, &mut definitions);
            }
            StyleNode::Group(group) => {
                for (inner_index, inner) in group.nodes.iter().enumerate() {
                    if let StyleNode::Rule(rule) = inner {
                        let comments = collect_doc_comments(&group.nodes, inner_index);
                        add_rule(rule, comments, source, &mut definitions);
                    }
                }
            }
            StyleNode::Comment(_) | StyleNode::Other => {}
        }
    }

    definitions
}

fn add_rule(
    rule: &StyleRule,
    comments: Option<Vec<String>>,
    source: Option<&SourceRef>,
    out: &mut Vec<ClassDefinition>,
) {
    let location = source.and_then(|source| to_location(&rule.position, source));

    for selector in &rule.selectors {
        for class_name in class_names(selector) {
            out.push(ClassDefinition {
                class_name,
                comments: comments.clone(),
                location: location.clone(),
            });
        }
    }
}

/// Doc comments (`/** ... */`) directly in front of `nodes[index]`, in
/// source order. The walk stops at the first sibling that is not a doc
/// comment.
pub fn collect_doc_comments(nodes: &[StyleNode], index: usize) -> Option<Vec<String>> {
    let mut comments: Vec<String> = nodes[..index.min(nodes.len())]
        .iter()
        .rev()
        .map_while(|node| match node {
            StyleNode::Comment(comment) => comment
                .text
                .strip_prefix('*')
                .map(|body| body.trim().to_string()),
            _ => None,
        })
        .collect();

    if comments.is_empty() {
        return None;
    }
    comments.reverse();
    Some(comments)
}

fn to_location(position: &NodePosition, source: &SourceRef) -> Option<Location> {
    let start = to_position(position.start?)?;
    let end = to_position(position.end?)?;
    Some(Location {
        source: source.clone(),
        range: Range { start, end },
    })
}

fn to_position(point: SourcePoint) -> Option<Position> {
    Some(Position::new(
        point.line.checked_sub(1)?,
        point.column.checked_sub(1)?,
    ))
}
