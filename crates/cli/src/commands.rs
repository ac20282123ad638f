use crate::progress::ProgressNotifier;
use anyhow::{anyhow, bail, Context, Result};
use classmap_extractor::{language_id_for_path, ClassDefinition, HttpFetcher, Location, ParserRegistry};
use classmap_indexer::{
    ClassmapConfig, IndexOrchestrator, RebuildOutcome, RebuildSummary, RebuildWatcher,
    WatcherConfig, WorkspaceScanner,
};
use classmap_query::{complete_with, find_definition, word_at, CompletionItem, MatcherSet};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Position inside a document, 1-based as editors show it. The cursor sits
/// before the character at `column`.
#[derive(Debug, Clone)]
pub struct CursorArgs {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Serialize)]
pub struct CompletionOutput {
    /// False when the cursor is not inside a class attribute.
    pub recognized: bool,
    pub items: Vec<CompletionItem>,
}

#[derive(Debug, Serialize)]
pub struct DefinitionOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub classes: Vec<ClassDefinition>,
}

/// A loaded project: configuration plus an orchestrator over its files.
pub struct Session {
    root: PathBuf,
    config: ClassmapConfig,
    orchestrator: Arc<IndexOrchestrator>,
}

impl Session {
    pub fn open(root: &Path, progress: bool) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("{} is not a directory", root.display()))?;
        let config = ClassmapConfig::load(&root)?;
        let scanner = WorkspaceScanner::from_config(&root, &config)?;
        let registry = ParserRegistry::with_defaults(Arc::new(HttpFetcher::new()?));
        let orchestrator = IndexOrchestrator::new(
            Arc::new(scanner),
            registry,
            Arc::new(ProgressNotifier::new(progress)),
        )
        .with_dedup_order(config.dedup_order);

        Ok(Self {
            root,
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        ClassmapConfig::path_for_root(&self.root)
    }

    pub fn class_count(&self) -> usize {
        self.orchestrator.current_snapshot().len()
    }

    pub async fn rebuild(&self) -> Result<RebuildSummary> {
        match self
            .orchestrator
            .request_rebuild(self.config.parse_options())
            .await?
        {
            RebuildOutcome::Completed(summary) => Ok(summary),
            RebuildOutcome::Coalesced => Err(anyhow!("rebuild already running")),
        }
    }

    pub async fn complete(&self, cursor: &CursorArgs) -> Result<CompletionOutput> {
        let (line, matchers) = self.prepare(cursor).await?;
        let snapshot = self.orchestrator.current_snapshot();

        let items = complete_with(&snapshot, &line, cursor.column - 1, &matchers.completion);
        Ok(CompletionOutput {
            recognized: items.is_some(),
            items: items.unwrap_or_default(),
        })
    }

    pub async fn definition(&self, cursor: &CursorArgs) -> Result<DefinitionOutput> {
        let (line, matchers) = self.prepare(cursor).await?;
        let snapshot = self.orchestrator.current_snapshot();

        let offset = cursor.column - 1;
        let location = find_definition(&snapshot, &line, offset, &matchers.definition).cloned();
        Ok(DefinitionOutput {
            class_name: word_at(&line, offset).map(str::to_string),
            location,
        })
    }

    /// Rebuild, then print one JSON line per rebuild until interrupted.
    pub async fn watch(self) -> Result<()> {
        let watcher = RebuildWatcher::start(
            Arc::clone(&self.orchestrator),
            &self.root,
            self.config.clone(),
            WatcherConfig::default(),
        )?;
        let mut updates = watcher.subscribe_updates();
        watcher.trigger("startup").await?;
        log::info!("Watching {} for stylesheet changes", self.root.display());

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Ok(update) => println!("{}", serde_json::to_string(&update)?),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Skipped {skipped} rebuild updates");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Stopping watcher");
                    break;
                }
            }
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<ListOutput> {
        self.rebuild().await?;
        Ok(ListOutput {
            classes: self.orchestrator.current_snapshot().definitions().to_vec(),
        })
    }

    /// Build the index and pick the cursor line plus the matchers for the
    /// file's language family.
    async fn prepare(&self, cursor: &CursorArgs) -> Result<(String, MatcherSet)> {
        if cursor.line == 0 || cursor.column == 0 {
            bail!("line and column are 1-based");
        }
        let language_id = language_id_for_path(&cursor.file);
        let family = self.config.family_of(&language_id).ok_or_else(|| {
            anyhow!(
                "{} is not listed as a markup, stylesheet or script language",
                cursor.file.display()
            )
        })?;

        let text = tokio::fs::read_to_string(&cursor.file)
            .await
            .with_context(|| format!("Failed to read {}", cursor.file.display()))?;
        let line = text
            .lines()
            .nth(cursor.line - 1)
            .ok_or_else(|| anyhow!("{} has no line {}", cursor.file.display(), cursor.line))?
            .to_string();

        self.rebuild().await?;
        Ok((
            line,
            MatcherSet::for_family(family, self.config.enable_emmet_support),
        ))
    }
}
