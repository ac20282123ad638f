use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A document that could not be read or parsed during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one rebuild cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebuildSummary {
    pub documents: usize,
    pub definitions: usize,
    pub unique_definitions: usize,
    pub failures: Vec<DocumentFailure>,
    pub time_ms: u64,
    /// False when discovery found nothing and the snapshot was left alone.
    pub published: bool,
}

impl RebuildSummary {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn add_failure(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.failures.push(DocumentFailure {
            path,
            reason: reason.into(),
        });
    }
}
