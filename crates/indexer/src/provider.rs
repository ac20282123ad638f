use crate::config::ClassmapConfig;
use crate::error::Result;
use async_trait::async_trait;
use classmap_extractor::language_id_for_path;
use std::path::{Path, PathBuf};

/// Reference to a document that may contain class definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub language_id: String,
}

impl DocumentRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language_id = language_id_for_path(&path);
        Self { path, language_id }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Source of documents for a rebuild.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Candidate documents in a stable order.
    async fn find_all_parseable_documents(&self) -> Result<Vec<DocumentRef>>;

    async fn read_document(&self, document: &DocumentRef) -> std::io::Result<String>;

    /// Pick up changed discovery settings. Providers without settings keep
    /// the default no-op.
    fn reconfigure(&self, _config: &ClassmapConfig) -> Result<()> {
        Ok(())
    }
}
