/// Status icon attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconHint {
    /// Rebuild in progress.
    Eye,
    /// Rebuild finished.
    Zap,
    /// Rebuild failed; a retry is up to the user.
    Alert,
    /// Nothing to index.
    Idle,
}

impl IconHint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eye => "eye",
            Self::Zap => "zap",
            Self::Alert => "alert",
            Self::Idle => "idle",
        }
    }
}

/// Status sink for rebuild progress. `terminal` marks the final message of
/// a cycle; progress updates are never terminal.
pub trait Notifier: Send + Sync {
    fn notify(&self, icon: IconHint, message: &str, terminal: bool);
}

/// Notifier that forwards to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, icon: IconHint, message: &str, terminal: bool) {
        match (icon, terminal) {
            (IconHint::Alert, _) => log::error!("{message}"),
            (_, true) => log::info!("{message}"),
            (_, false) => log::debug!("{message}"),
        }
    }
}
