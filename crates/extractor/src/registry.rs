use crate::css::extract_class_definitions;
use crate::definition::{ClassDefinition, SourceRef};
use crate::error::{ExtractorError, Result};
use crate::fetch::StylesheetFetcher;
use crate::markup::MarkupDiscovery;
use crate::stylesheet::parse_stylesheet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-rebuild parse switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub enable_external_stylesheet_support: bool,
}

/// A document handed to a parse engine.
#[derive(Debug, Clone)]
pub struct Document {
    /// Lowercased file extension, e.g. `css`.
    pub language_id: String,
    pub text: String,
    pub source: Option<SourceRef>,
}

impl Document {
    pub fn new(language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language_id: language_id.into(),
            text: text.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }
}

/// Turns a document of one language into class definitions.
#[async_trait]
pub trait ParseEngine: Send + Sync {
    /// Primary language identifier.
    fn language_id(&self) -> &'static str;

    /// Every identifier the engine accepts.
    fn extensions(&self) -> &'static [&'static str];

    async fn parse(&self, document: &Document, options: &ParseOptions)
        -> Result<Vec<ClassDefinition>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CssParseEngine;

#[async_trait]
impl ParseEngine for CssParseEngine {
    fn language_id(&self) -> &'static str {
        "css"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["css"]
    }

    async fn parse(
        &self,
        document: &Document,
        _options: &ParseOptions,
    ) -> Result<Vec<ClassDefinition>> {
        let sheet = parse_stylesheet(&document.text)?;
        Ok(extract_class_definitions(&sheet, document.source.as_ref()))
    }
}

#[derive(Debug, Clone)]
pub struct HtmlParseEngine {
    discovery: MarkupDiscovery,
}

impl HtmlParseEngine {
    pub fn new(fetcher: Arc<dyn StylesheetFetcher>) -> Self {
        Self {
            discovery: MarkupDiscovery::new(fetcher),
        }
    }

    pub fn with_discovery(discovery: MarkupDiscovery) -> Self {
        Self { discovery }
    }
}

#[async_trait]
impl ParseEngine for HtmlParseEngine {
    fn language_id(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    async fn parse(
        &self,
        document: &Document,
        options: &ParseOptions,
    ) -> Result<Vec<ClassDefinition>> {
        self.discovery
            .discover(&document.text, document.source.as_ref(), options)
            .await
    }
}

/// Language identifier to parse engine map.
#[derive(Default, Clone)]
pub struct ParserRegistry {
    engines: HashMap<String, Arc<dyn ParseEngine>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the CSS and HTML engines.
    pub fn with_defaults(fetcher: Arc<dyn StylesheetFetcher>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CssParseEngine));
        registry.register(Arc::new(HtmlParseEngine::new(fetcher)));
        registry
    }

    /// Register an engine under each of its extensions, replacing earlier
    /// engines for the same identifiers.
    pub fn register(&mut self, engine: Arc<dyn ParseEngine>) {
        for extension in engine.extensions() {
            self.engines
                .insert(extension.to_ascii_lowercase(), Arc::clone(&engine));
        }
    }

    #[must_use]
    pub fn supports(&self, language_id: &str) -> bool {
        self.engines.contains_key(&language_id.to_ascii_lowercase())
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn supported_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.engines.keys().cloned().collect();
        languages.sort();
        languages
    }

    pub async fn dispatch(
        &self,
        document: &Document,
        options: &ParseOptions,
    ) -> Result<Vec<ClassDefinition>> {
        let engine = self
            .engines
            .get(&document.language_id.to_ascii_lowercase())
            .ok_or_else(|| ExtractorError::unsupported_language(&document.language_id))?;
        engine.parse(document, options).await
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("languages", &self.supported_languages())
            .finish()
    }
}
