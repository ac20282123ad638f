//! Stylesheet discovery inside HTML documents.
//!
//! Two sources are recognised: the body of every `<style>` element, parsed in
//! place, and `<link rel="stylesheet">` elements pointing at an `http(s)` URL.
//! Linked stylesheets are only fetched when the rebuild asks for external
//! stylesheet support.

use crate::css::extract_class_definitions;
use crate::definition::{ClassDefinition, SourceRef};
use crate::error::{ExtractorError, Result};
use crate::fetch::StylesheetFetcher;
use crate::language::Language;
use crate::registry::ParseOptions;
use crate::stylesheet::{char_column, parse_stylesheet, parse_stylesheet_at, TextOrigin};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tree_sitter::Node;

/// Maximum number of external stylesheets fetched at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;

/// Result of a single pass over a markup document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarkupScan {
    /// Definitions from inline `<style>` elements.
    pub definitions: Vec<ClassDefinition>,
    /// External stylesheet URLs, in document order.
    pub stylesheet_urls: Vec<String>,
}

/// Parse markup once, extracting inline style definitions and collecting
/// linked stylesheet URLs.
pub fn scan_markup(text: &str, source: Option<&SourceRef>) -> Result<MarkupScan> {
    let mut parser = Language::Html.parser()?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| ExtractorError::parse("markup"))?;

    let mut scan = MarkupScan::default();
    visit(tree.root_node(), text, source, &mut scan)?;
    Ok(scan)
}

fn visit(node: Node, text: &str, source: Option<&SourceRef>, scan: &mut MarkupScan) -> Result<()> {
    match node.kind() {
        "style_element" => {
            if let Some(body) = child_of_kind(node, "raw_text") {
                let start = body.start_position();
                let origin = TextOrigin {
                    line: start.row as u32,
                    column: char_column(text, body.start_byte(), start.column) as u32,
                };
                let sheet = parse_stylesheet_at(&text[body.byte_range()], origin)?;
                scan.definitions
                    .extend(extract_class_definitions(&sheet, source));
            }
            return Ok(());
        }
        "start_tag" | "self_closing_tag" => {
            if let Some(url) = linked_stylesheet(node, text) {
                scan.stylesheet_urls.push(url);
            }
            return Ok(());
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, text, source, scan)?;
    }
    Ok(())
}

/// The `href` of a `<link rel="stylesheet">` tag, if it is a network URL.
fn linked_stylesheet(tag: Node, text: &str) -> Option<String> {
    let name = child_of_kind(tag, "tag_name")?;
    if !text[name.byte_range()].eq_ignore_ascii_case("link") {
        return None;
    }

    let mut is_stylesheet = false;
    let mut href = None;
    let mut cursor = tag.walk();
    for attribute in tag.children(&mut cursor).filter(|c| c.kind() == "attribute") {
        let Some(attr_name) = child_of_kind(attribute, "attribute_name") else {
            continue;
        };
        let value = attribute_value(attribute, text).unwrap_or_default();
        match text[attr_name.byte_range()].to_ascii_lowercase().as_str() {
            "rel" => {
                is_stylesheet = value
                    .split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"));
            }
            "href" => href = Some(value.trim().to_string()),
            _ => {}
        }
    }

    href.filter(|url| is_stylesheet && is_network_url(url))
}

fn attribute_value<'t>(attribute: Node, text: &'t str) -> Option<&'t str> {
    let mut cursor = attribute.walk();
    let children: Vec<Node> = attribute.children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "attribute_value" => return Some(&text[child.byte_range()]),
            // `""` has no inner attribute_value node.
            "quoted_attribute_value" => {
                return Some(
                    child_of_kind(child, "attribute_value")
                        .map_or("", |inner| &text[inner.byte_range()]),
                );
            }
            _ => {}
        }
    }
    None
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn is_network_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Markup parse engine core: inline styles plus optionally fetched external
/// stylesheets.
#[derive(Clone)]
pub struct MarkupDiscovery {
    fetcher: Arc<dyn StylesheetFetcher>,
    concurrency: usize,
}

impl MarkupDiscovery {
    pub fn new(fetcher: Arc<dyn StylesheetFetcher>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn discover(
        &self,
        text: &str,
        source: Option<&SourceRef>,
        options: &ParseOptions,
    ) -> Result<Vec<ClassDefinition>> {
        let MarkupScan {
            mut definitions,
            stylesheet_urls,
        } = scan_markup(text, source)?;

        if options.enable_external_stylesheet_support && !stylesheet_urls.is_empty() {
            definitions.extend(self.fetch_external(stylesheet_urls).await);
        } else if !stylesheet_urls.is_empty() {
            log::debug!(
                "Skipping {} external stylesheet(s): external stylesheet support is disabled",
                stylesheet_urls.len()
            );
        }

        Ok(definitions)
    }

    /// Fetch and extract every URL. A URL that fails contributes nothing.
    async fn fetch_external(&self, urls: Vec<String>) -> Vec<ClassDefinition> {
        let results: Vec<Vec<ClassDefinition>> = stream::iter(urls)
            .map(|url| async move {
                match self.fetch_one(&url).await {
                    Ok(definitions) => definitions,
                    Err(e) => {
                        log::warn!("Ignoring external stylesheet: {e}");
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<ClassDefinition>> {
        let content = self.fetcher.fetch(url).await?;
        let sheet = parse_stylesheet(&content).map_err(|e| ExtractorError::RemoteParse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let definitions = extract_class_definitions(&sheet, Some(&SourceRef::Url(url.to_string())));
        log::debug!("Fetched {url}: {} class definition(s)", definitions.len());
        Ok(definitions)
    }
}

impl std::fmt::Debug for MarkupDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupDiscovery")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
