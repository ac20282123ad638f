//! CSS class extraction for classmap
//!
//! ```text
//! Document ──► ParserRegistry ──► CssParseEngine  ──► parse_stylesheet ──► extract_class_definitions
//!                     │
//!                     └─────────► HtmlParseEngine ──► scan_markup ──► <style> bodies ─┘
//!                                                          │
//!                                                          └──► <link> URLs ──► StylesheetFetcher
//! ```

pub mod css;
pub mod definition;
pub mod error;
pub mod fetch;
pub mod language;
pub mod markup;
pub mod registry;
pub mod stylesheet;

pub use css::{class_names, collect_doc_comments, extract_class_definitions};
pub use definition::{ClassDefinition, Location, Position, Range, SourceRef};
pub use error::{ExtractorError, Result};
pub use fetch::{HttpFetcher, StylesheetFetcher};
pub use language::{language_id_for_path, Language};
pub use markup::{scan_markup, MarkupDiscovery, MarkupScan, DEFAULT_FETCH_CONCURRENCY};
pub use registry::{
    CssParseEngine, Document, HtmlParseEngine, ParseEngine, ParseOptions, ParserRegistry,
};
pub use stylesheet::{
    parse_stylesheet, parse_stylesheet_at, NodePosition, SourcePoint, StyleComment, StyleGroup,
    StyleNode, StyleRule, Stylesheet, TextOrigin,
};
