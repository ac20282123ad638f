use async_trait::async_trait;
use classmap_extractor::{
    ClassDefinition, Document, ExtractorError, ParseEngine, ParseOptions, ParserRegistry, Result,
    StylesheetFetcher,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct OfflineFetcher;

#[async_trait]
impl StylesheetFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(ExtractorError::remote_fetch(url, "offline"))
    }
}

struct UppercaseEngine;

#[async_trait]
impl ParseEngine for UppercaseEngine {
    fn language_id(&self) -> &'static str {
        "txt"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    async fn parse(&self, document: &Document, _options: &ParseOptions) -> Result<Vec<ClassDefinition>> {
        Ok(document
            .text
            .split_whitespace()
            .map(|word| ClassDefinition::new(word.to_uppercase()))
            .collect())
    }
}

fn registry() -> ParserRegistry {
    ParserRegistry::with_defaults(Arc::new(OfflineFetcher))
}

#[tokio::test]
async fn test_dispatch_by_language() {
    let registry = registry();
    let options = ParseOptions::default();

    let css = registry
        .dispatch(&Document::new("css", ".a {} .b {}"), &options)
        .await
        .unwrap();
    assert_eq!(css.len(), 2);

    let html = registry
        .dispatch(&Document::new("HTM", "<style>.c {}</style>"), &options)
        .await
        .unwrap();
    assert_eq!(html[0].class_name, "c");
}

#[tokio::test]
async fn test_unsupported_language() {
    let err = registry()
        .dispatch(&Document::new("scss", ".a {}"), &ParseOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::UnsupportedLanguage(ref id) if id == "scss"));
}

#[tokio::test]
async fn test_register_custom_engine() {
    let mut registry = registry();
    assert!(!registry.supports("txt"));

    registry.register(Arc::new(UppercaseEngine));

    assert_eq!(registry.supported_languages(), vec!["css", "htm", "html", "txt"]);
    let definitions = registry
        .dispatch(&Document::new("txt", "a b"), &ParseOptions::default())
        .await
        .unwrap();
    assert_eq!(definitions, vec![ClassDefinition::new("A"), ClassDefinition::new("B")]);
}
