use crate::config::ClassmapConfig;
use crate::error::{IndexerError, Result};
use crate::index::{ClassIndex, DedupOrder};
use crate::notifier::{IconHint, Notifier};
use crate::provider::{DocumentProvider, DocumentRef};
use crate::stats::RebuildSummary;
use classmap_extractor::{ClassDefinition, Document, ParseOptions, ParserRegistry, SourceRef};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

/// Maximum number of documents processed at once.
pub const DEFAULT_DOCUMENT_CONCURRENCY: usize = 30;

const PROGRESS_MESSAGE: &str = "Looking for CSS classes in the workspace...";

/// Result of [`IndexOrchestrator::request_rebuild`].
#[derive(Debug, Clone)]
pub enum RebuildOutcome {
    /// The caller ran the rebuild; summary of the last cycle.
    Completed(RebuildSummary),
    /// A rebuild was already running; one follow-up cycle is scheduled.
    Coalesced,
}

#[derive(Debug, Default)]
struct RebuildState {
    rebuilding: bool,
    /// Set while rebuilding when another request arrived; holds the newest
    /// options.
    redo: Option<ParseOptions>,
}

/// Owns the published class index and runs single-flight rebuilds.
pub struct IndexOrchestrator {
    provider: Arc<dyn DocumentProvider>,
    registry: Arc<ParserRegistry>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<RebuildState>,
    snapshot_tx: watch::Sender<Arc<ClassIndex>>,
    concurrency: usize,
    dedup_order: DedupOrder,
}

impl IndexOrchestrator {
    pub fn new(
        provider: Arc<dyn DocumentProvider>,
        registry: ParserRegistry,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(ClassIndex::new()));
        Self {
            provider,
            registry: Arc::new(registry),
            notifier,
            state: Mutex::new(RebuildState::default()),
            snapshot_tx,
            concurrency: DEFAULT_DOCUMENT_CONCURRENCY,
            dedup_order: DedupOrder::default(),
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_dedup_order(mut self, dedup_order: DedupOrder) -> Self {
        self.dedup_order = dedup_order;
        self
    }

    /// The last published snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<ClassIndex> {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver that observes every publish.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<ClassIndex>> {
        self.snapshot_tx.subscribe()
    }

    /// Hand changed discovery settings to the document provider. Takes
    /// effect from the next cycle.
    pub fn reconfigure(&self, config: &ClassmapConfig) -> Result<()> {
        self.provider.reconfigure(config)
    }

    #[must_use]
    pub fn is_rebuilding(&self) -> bool {
        self.lock_state().rebuilding
    }

    /// Rebuild the index, or schedule a follow-up if a rebuild is running.
    ///
    /// When this call starts the rebuild it returns only after the cycle and
    /// any follow-up cycles requested meanwhile are done. Requests arriving
    /// during a cycle collapse into a single follow-up that uses the newest
    /// options. A failed cycle drops any pending follow-up.
    pub async fn request_rebuild(&self, options: ParseOptions) -> Result<RebuildOutcome> {
        let mut guard = {
            let mut state = self.lock_state();
            if state.rebuilding {
                state.redo = Some(options);
                log::debug!("Rebuild already running, scheduling a follow-up");
                return Ok(RebuildOutcome::Coalesced);
            }
            state.rebuilding = true;
            RebuildingGuard {
                state: &self.state,
                armed: true,
            }
        };

        let mut options = options;
        loop {
            let summary = self.run_cycle(options).await?;
            match guard.next_cycle() {
                Some(next) => {
                    log::info!("Rebuild requested during the last cycle, running again");
                    options = next;
                }
                None => return Ok(RebuildOutcome::Completed(summary)),
            }
        }
    }

    async fn run_cycle(&self, options: ParseOptions) -> Result<RebuildSummary> {
        let result = self.execute_cycle(options).await;
        if let Err(e) = &result {
            log::error!("Rebuild failed: {e}");
            self.notifier.notify(
                IconHint::Alert,
                "Failed to cache the CSS classes in the workspace (run the rebuild again to retry)",
                true,
            );
        }
        result
    }

    async fn execute_cycle(&self, options: ParseOptions) -> Result<RebuildSummary> {
        let start = Instant::now();
        let mut summary = RebuildSummary::default();
        self.notifier.notify(IconHint::Eye, PROGRESS_MESSAGE, false);

        log::info!("Looking for parseable documents...");
        let documents = self
            .provider
            .find_all_parseable_documents()
            .await
            .map_err(|e| match e {
                IndexerError::Discovery(_) => e,
                other => IndexerError::Discovery(other.to_string()),
            })?;
        if documents.is_empty() {
            log::info!("Found no documents");
            self.notifier
                .notify(IconHint::Idle, "No documents to look for CSS classes in", true);
            return Ok(summary);
        }

        let total = documents.len();
        summary.documents = total;
        log::info!("Parsing {total} documents and looking for CSS class definitions...");

        let mut parsed: Vec<(usize, Vec<ClassDefinition>)> = Vec::with_capacity(total);
        let mut completed = 0usize;
        let mut tasks = stream::iter(documents.into_iter().enumerate())
            .map(|(position, document)| {
                let provider = Arc::clone(&self.provider);
                let registry = Arc::clone(&self.registry);
                tokio::spawn(async move {
                    let result = process_document(provider, registry, &document, options).await;
                    (position, document, result)
                })
            })
            .buffer_unordered(self.concurrency);

        while let Some(joined) = tasks.next().await {
            let (position, document, result) =
                joined.map_err(|e| IndexerError::TaskFailed(format!("Task panicked: {e}")))?;

            match result {
                Ok(definitions) => parsed.push((position, definitions)),
                Err(e) => {
                    log::warn!("Failed to process document: {e}");
                    summary.add_failure(document.path, e.to_string());
                }
            }

            completed += 1;
            #[allow(clippy::cast_precision_loss)]
            let progress = completed as f64 / total as f64 * 100.0;
            self.notifier.notify(
                IconHint::Eye,
                &format!("{PROGRESS_MESSAGE} ({progress:.2}%)"),
                false,
            );
        }

        if self.dedup_order == DedupOrder::Discovery {
            parsed.sort_by_key(|(position, _)| *position);
        }
        let definitions: Vec<ClassDefinition> =
            parsed.into_iter().flat_map(|(_, found)| found).collect();
        summary.definitions = definitions.len();

        let index = ClassIndex::from_definitions(definitions);
        summary.unique_definitions = index.len();
        self.snapshot_tx.send_replace(Arc::new(index));
        summary.published = true;

        #[allow(clippy::cast_possible_truncation)]
        {
            summary.time_ms = start.elapsed().as_millis() as u64;
        }

        log::info!(
            "Summary: {} parseable documents, {} CSS class definitions, {} unique, {} failed ({} ms)",
            summary.documents,
            summary.definitions,
            summary.unique_definitions,
            summary.failure_count(),
            summary.time_ms
        );
        if !summary.failures.is_empty() {
            let failed: Vec<String> = summary
                .failures
                .iter()
                .map(|f| f.path.display().to_string())
                .collect();
            log::warn!("Documents that failed to parse:\n{}", failed.join("\n"));
        }

        self.notifier
            .notify(IconHint::Zap, "CSS classes cached", true);
        Ok(summary)
    }

    fn lock_state(&self) -> MutexGuard<'_, RebuildState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for IndexOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexOrchestrator")
            .field("registry", &self.registry)
            .field("concurrency", &self.concurrency)
            .field("dedup_order", &self.dedup_order)
            .field("definitions", &self.snapshot_tx.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Returns the orchestrator to idle when the rebuilding caller finishes,
/// fails or is dropped.
struct RebuildingGuard<'a> {
    state: &'a Mutex<RebuildState>,
    armed: bool,
}

impl RebuildingGuard<'_> {
    /// Take the pending follow-up, or go idle in the same critical section.
    fn next_cycle(&mut self) -> Option<ParseOptions> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = state.redo.take();
        if next.is_none() {
            state.rebuilding = false;
            self.armed = false;
        }
        next
    }
}

impl Drop for RebuildingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.rebuilding = false;
            state.redo = None;
        }
    }
}

async fn process_document(
    provider: Arc<dyn DocumentProvider>,
    registry: Arc<ParserRegistry>,
    document: &DocumentRef,
    options: ParseOptions,
) -> Result<Vec<ClassDefinition>> {
    log::debug!("Processing document: {}", document.path.display());
    let text = provider
        .read_document(document)
        .await
        .map_err(|source| IndexerError::DocumentRead {
            path: document.path.clone(),
            source,
        })?;

    let parse_input = Document::new(document.language_id.clone(), text)
        .with_source(SourceRef::File(document.path.clone()));
    registry
        .dispatch(&parse_input, &options)
        .await
        .map_err(|source| IndexerError::DocumentParse {
            path: document.path.clone(),
            source,
        })
}
