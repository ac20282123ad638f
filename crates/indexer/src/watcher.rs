use crate::config::{ClassmapConfig, CONFIG_FILE_NAME};
use crate::orchestrator::{IndexOrchestrator, RebuildOutcome};
use crate::stats::RebuildSummary;
use crate::{IndexerError, Result};
use classmap_extractor::Language;
use log::{error, info, warn};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::{broadcast, mpsc};
use tokio::time;

const SAVE_REASON: &str = "stylesheet_saved";
const CONFIG_REASON: &str = "config_changed";

#[derive(Debug, Clone, Serialize)]
pub struct RebuildUpdate {
    pub completed_at: SystemTime,
    pub duration_ms: u64,
    pub reason: String,
    /// `None` when the cycle failed or was folded into a running one.
    pub summary: Option<RebuildSummary>,
    pub error: Option<String>,
}

impl RebuildUpdate {
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub max_batch_wait: Duration,
    pub notify_poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_batch_wait: Duration::from_secs(2),
            notify_poll_interval: Duration::from_secs(2),
        }
    }
}

/// Rebuilds the index when a stylesheet is saved or when `classmap.toml`
/// changes a discovery setting.
#[derive(Clone)]
pub struct RebuildWatcher {
    inner: Arc<RebuildWatcherInner>,
}

struct RebuildWatcherInner {
    command_tx: mpsc::Sender<WatcherCommand>,
    update_tx: broadcast::Sender<RebuildUpdate>,
    _watcher: std::sync::Mutex<RecommendedWatcher>,
}

enum WatcherCommand {
    Trigger { reason: String },
    Shutdown,
}

impl RebuildWatcher {
    pub fn start(
        orchestrator: Arc<IndexOrchestrator>,
        root: impl AsRef<Path>,
        config: ClassmapConfig,
        watcher_config: WatcherConfig,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(16);
        let (update_tx, _) = broadcast::channel(32);

        let watcher = create_fs_watcher(&root, event_tx, watcher_config.notify_poll_interval)?;

        spawn_rebuild_loop(
            orchestrator,
            root,
            config,
            &watcher_config,
            event_rx,
            command_rx,
            update_tx.clone(),
        );

        Ok(Self {
            inner: Arc::new(RebuildWatcherInner {
                command_tx,
                update_tx,
                _watcher: std::sync::Mutex::new(watcher),
            }),
        })
    }

    /// Ask for a rebuild right away, skipping the debounce window.
    pub async fn trigger(&self, reason: impl Into<String>) -> Result<()> {
        self.inner
            .command_tx
            .send(WatcherCommand::Trigger {
                reason: reason.into(),
            })
            .await
            .map_err(|e| IndexerError::Watcher(format!("failed to send trigger: {e}")))?;
        Ok(())
    }

    #[must_use]
    pub fn subscribe_updates(&self) -> broadcast::Receiver<RebuildUpdate> {
        self.inner.update_tx.subscribe()
    }
}

impl Drop for RebuildWatcher {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.command_tx.try_send(WatcherCommand::Shutdown);
        }
    }
}

fn create_fs_watcher(
    root: &Path,
    sender: mpsc::Sender<notify::Result<Event>>,
    poll_interval: Duration,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = sender.blocking_send(res);
        },
        NotifyConfig::default().with_poll_interval(poll_interval),
    )
    .map_err(|e| IndexerError::Watcher(format!("watcher init failed: {e}")))?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| IndexerError::Watcher(format!("failed to watch {}: {e}", root.display())))?;
    Ok(watcher)
}

fn spawn_rebuild_loop(
    orchestrator: Arc<IndexOrchestrator>,
    root: PathBuf,
    mut config: ClassmapConfig,
    watcher_config: &WatcherConfig,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut command_rx: mpsc::Receiver<WatcherCommand>,
    update_tx: broadcast::Sender<RebuildUpdate>,
) {
    let mut state = DebounceState::new(watcher_config.debounce, watcher_config.max_batch_wait);

    tokio::spawn(async move {
        loop {
            let next_deadline = state.next_deadline();

            tokio::select! {
                Some(event) = event_rx.recv() => {
                    handle_event(&orchestrator, &root, event, &mut config, &mut state);
                }
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        WatcherCommand::Trigger { reason } => state.force_run(reason),
                        WatcherCommand::Shutdown => break,
                    }
                }
                () = async {
                    if let Some(deadline) = next_deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if state.should_run() && next_deadline.is_some() => {
                    let reason = state.take_reason().unwrap_or_else(|| SAVE_REASON.to_string());
                    state.reset();
                    info!("Rebuilding class index ({reason})");

                    let started = Instant::now();
                    let result = orchestrator.request_rebuild(config.parse_options()).await;
                    #[allow(clippy::cast_possible_truncation)]
                    let duration_ms = started.elapsed().as_millis() as u64;

                    let update = match result {
                        Ok(RebuildOutcome::Completed(summary)) => RebuildUpdate {
                            completed_at: SystemTime::now(),
                            duration_ms,
                            reason,
                            summary: Some(summary),
                            error: None,
                        },
                        Ok(RebuildOutcome::Coalesced) => RebuildUpdate {
                            completed_at: SystemTime::now(),
                            duration_ms,
                            reason,
                            summary: None,
                            error: None,
                        },
                        Err(err) => {
                            error!("Watcher rebuild failed: {err}");
                            RebuildUpdate {
                                completed_at: SystemTime::now(),
                                duration_ms,
                                reason,
                                summary: None,
                                error: Some(err.to_string()),
                            }
                        }
                    };
                    let _ = update_tx.send(update);
                }
                else => break,
            }
        }
    });
}

/// What a file-system change means for the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    StylesheetSaved,
    ConfigChanged,
}

fn handle_event(
    orchestrator: &IndexOrchestrator,
    root: &Path,
    event: notify::Result<Event>,
    config: &mut ClassmapConfig,
    state: &mut DebounceState,
) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            warn!("Watcher error: {err}");
            return;
        }
    };
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }

    for path in &event.paths {
        match classify_path(root, path) {
            Some(ChangeKind::StylesheetSaved) => {
                if !matches!(event.kind, EventKind::Remove(_)) && state.record_path_if_new(path) {
                    state.record_event(SAVE_REASON);
                }
            }
            Some(ChangeKind::ConfigChanged) => {
                match ClassmapConfig::load(root) {
                    Ok(updated) if updated.requires_rebuild(config) => {
                        if let Err(err) = orchestrator.reconfigure(&updated) {
                            warn!("Ignoring invalid {CONFIG_FILE_NAME}: {err}");
                            continue;
                        }
                        *config = updated;
                        state.record_event(CONFIG_REASON);
                    }
                    Ok(updated) => *config = updated,
                    Err(err) => warn!("Ignoring invalid {CONFIG_FILE_NAME}: {err}"),
                }
            }
            None => {}
        }
    }
}

fn classify_path(root: &Path, path: &Path) -> Option<ChangeKind> {
    const IGNORED: &[&str] = &[".git", ".hg", ".svn", "node_modules", "target"];

    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.components().any(|component| {
        let name = component.as_os_str().to_string_lossy();
        IGNORED.iter().any(|ignored| name == *ignored)
    }) {
        return None;
    }

    if relative.as_os_str() == CONFIG_FILE_NAME {
        return Some(ChangeKind::ConfigChanged);
    }
    (Language::from_path(path) == Language::Css).then_some(ChangeKind::StylesheetSaved)
}

struct DebounceState {
    debounce: Duration,
    max_batch: Duration,
    dirty: bool,
    last_event: Option<Instant>,
    first_event: Option<Instant>,
    reason: Option<String>,
    force_immediate: bool,
    recent_paths: VecDeque<(PathBuf, Instant)>,
    dedup_window: Duration,
}

impl DebounceState {
    const fn new(debounce: Duration, max_batch: Duration) -> Self {
        Self {
            debounce,
            max_batch,
            dirty: false,
            last_event: None,
            first_event: None,
            reason: None,
            force_immediate: false,
            recent_paths: VecDeque::new(),
            dedup_window: debounce,
        }
    }

    fn record_event(&mut self, reason: &str) {
        // A config change outranks a plain save in the reported reason.
        if self.reason.as_deref() != Some(CONFIG_REASON) {
            self.reason = Some(reason.to_string());
        }
        self.last_event = Some(Instant::now());
        self.first_event.get_or_insert_with(Instant::now);
        self.dirty = true;
    }

    fn force_run(&mut self, reason: String) {
        self.reason = Some(reason);
        self.force_immediate = true;
        self.dirty = true;
    }

    const fn should_run(&self) -> bool {
        self.dirty
    }

    fn next_deadline(&self) -> Option<time::Instant> {
        if !self.dirty {
            return None;
        }
        if self.force_immediate {
            return Some(time::Instant::now());
        }

        let settled = self.last_event.map(|last| last + self.debounce);
        let forced = self.first_event.map(|first| first + self.max_batch);
        let deadline = match (settled, forced) {
            (Some(settled), Some(forced)) => Some(settled.min(forced)),
            (settled, forced) => settled.or(forced),
        };
        deadline.map(time::Instant::from_std)
    }

    fn take_reason(&mut self) -> Option<String> {
        self.reason.take()
    }

    fn reset(&mut self) {
        self.dirty = false;
        self.last_event = None;
        self.first_event = None;
        self.reason = None;
        self.force_immediate = false;
        self.recent_paths.clear();
    }

    /// Editors often emit several events per save; count a path once per
    /// window.
    fn record_path_if_new(&mut self, path: &Path) -> bool {
        let now = Instant::now();
        self.recent_paths
            .retain(|(_, seen)| now.duration_since(*seen) <= self.dedup_window);
        if self.recent_paths.iter().any(|(seen, _)| seen == path) {
            return false;
        }
        self.recent_paths.push_back((path.to_path_buf(), now));
        true
    }
}
