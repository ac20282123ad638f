//! # Classmap Indexer
//!
//! Keeps an in-memory index of the CSS classes defined across a project.
//!
//! ## Pipeline
//!
//! ```text
//! request_rebuild()
//!     │
//!     ├──> DocumentProvider (include/exclude globs)
//!     │      └─> Document references
//!     │
//!     ├──> ParserRegistry (30 documents in flight)
//!     │      └─> Class definitions, per-document failures
//!     │
//!     └──> Dedup by class name
//!            └─> ClassIndex snapshot (watch channel)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use classmap_extractor::{HttpFetcher, ParserRegistry};
//! use classmap_indexer::{ClassmapConfig, IndexOrchestrator, LogNotifier, WorkspaceScanner};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let root = std::path::Path::new("/path/to/project");
//!     let config = ClassmapConfig::load(root)?;
//!     let registry = ParserRegistry::with_defaults(Arc::new(HttpFetcher::new()?));
//!     let orchestrator = IndexOrchestrator::new(
//!         Arc::new(WorkspaceScanner::from_config(root, &config)?),
//!         registry,
//!         Arc::new(LogNotifier),
//!     );
//!
//!     orchestrator.request_rebuild(config.parse_options()).await?;
//!     println!("{} classes", orchestrator.current_snapshot().len());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod index;
mod notifier;
mod orchestrator;
mod provider;
mod scanner;
mod stats;
mod watcher;

pub use config::{ClassmapConfig, LanguageFamily, CONFIG_FILE_NAME};
pub use error::{IndexerError, Result};
pub use index::{ClassIndex, DedupOrder};
pub use notifier::{IconHint, LogNotifier, Notifier};
pub use orchestrator::{IndexOrchestrator, RebuildOutcome, DEFAULT_DOCUMENT_CONCURRENCY};
pub use provider::{DocumentProvider, DocumentRef};
pub use scanner::WorkspaceScanner;
pub use stats::{DocumentFailure, RebuildSummary};
pub use watcher::{RebuildUpdate, RebuildWatcher, WatcherConfig};
