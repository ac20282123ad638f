//! Markup discovery with a scripted fetcher

use async_trait::async_trait;
use classmap_extractor::{
    ClassDefinition, ExtractorError, MarkupDiscovery, ParseOptions, Result, SourceRef,
    StylesheetFetcher,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

#[derive(Default)]
struct ScriptedFetcher {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Holds each fetch until this many are waiting together.
    barrier: Option<Barrier>,
}

impl ScriptedFetcher {
    fn with(responses: &[(&str, &str)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl StylesheetFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        match &self.barrier {
            Some(barrier) => {
                barrier.wait().await;
            }
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractorError::remote_fetch(url, "404 Not Found"))
    }
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <link rel="stylesheet" href="https://cdn.example.com/kit.css">
  <link rel="stylesheet" href="https://cdn.example.com/missing.css">
  <style>.local { color: red; }</style>
</head>
<body class="local"></body>
</html>
"#;

fn names(definitions: &[ClassDefinition]) -> Vec<&str> {
    let mut names: Vec<&str> = definitions.iter().map(|d| d.class_name.as_str()).collect();
    names.sort_unstable();
    names
}

#[tokio::test]
async fn test_external_disabled_never_fetches() {
    let fetcher = Arc::new(ScriptedFetcher::with(&[(
        "https://cdn.example.com/kit.css",
        ".remote {}",
    )]));
    let discovery = MarkupDiscovery::new(fetcher.clone());

    let definitions = discovery
        .discover(PAGE, None, &ParseOptions::default())
        .await
        .unwrap();

    assert_eq!(names(&definitions), vec!["local"]);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_external_enabled_tolerates_failed_url() {
    let fetcher = Arc::new(ScriptedFetcher::with(&[(
        "https://cdn.example.com/kit.css",
        "/** From the kit */\n.remote { color: blue; }",
    )]));
    let discovery = MarkupDiscovery::new(fetcher.clone());
    let options = ParseOptions {
        enable_external_stylesheet_support: true,
    };
    let source = SourceRef::File(PathBuf::from("index.html"));

    let definitions = discovery.discover(PAGE, Some(&source), &options).await.unwrap();

    assert_eq!(names(&definitions), vec!["local", "remote"]);
    assert_eq!(
        fetcher.calls(),
        vec![
            "https://cdn.example.com/kit.css".to_string(),
            "https://cdn.example.com/missing.css".to_string(),
        ]
    );

    let remote = definitions.iter().find(|d| d.class_name == "remote").unwrap();
    assert_eq!(remote.comments, Some(vec!["From the kit".to_string()]));
    assert_eq!(
        remote.location.as_ref().map(|l| &l.source),
        Some(&SourceRef::Url("https://cdn.example.com/kit.css".to_string()))
    );

    let local = definitions.iter().find(|d| d.class_name == "local").unwrap();
    assert_eq!(local.location.as_ref().map(|l| &l.source), Some(&source));
}

#[tokio::test]
async fn test_fetch_concurrency_is_bounded() {
    let links: String = (0..24)
        .map(|i| format!("<link rel=\"stylesheet\" href=\"https://cdn.example.com/{i}.css\">\n"))
        .collect();
    let page = format!("<html><head>\n{links}</head></html>");
    let fetcher = Arc::new(ScriptedFetcher {
        barrier: Some(Barrier::new(4)),
        ..ScriptedFetcher::default()
    });
    let discovery = MarkupDiscovery::new(fetcher.clone()).with_concurrency(4);
    let options = ParseOptions {
        enable_external_stylesheet_support: true,
    };

    // Fetches only get past the barrier four at a time.
    let definitions = tokio::time::timeout(
        Duration::from_secs(5),
        discovery.discover(&page, None, &options),
    )
    .await
    .expect("fetches overlapped")
    .unwrap();

    assert!(definitions.is_empty());
    assert_eq!(fetcher.calls().len(), 24);
    assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 4);
}
