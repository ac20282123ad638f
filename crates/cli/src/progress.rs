use classmap_indexer::{IconHint, LogNotifier, Notifier};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Spinner on stderr while a rebuild runs; terminal messages go to the log.
pub struct ProgressNotifier {
    visible: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressNotifier {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            spinner: Mutex::new(None),
        }
    }

    fn new_spinner() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl Notifier for ProgressNotifier {
    fn notify(&self, icon: IconHint, message: &str, terminal: bool) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if terminal {
            if let Some(bar) = spinner.take() {
                bar.finish_and_clear();
            }
            LogNotifier.notify(icon, message, terminal);
            return;
        }
        if !self.visible {
            return;
        }
        spinner
            .get_or_insert_with(Self::new_spinner)
            .set_message(message.to_string());
    }
}
