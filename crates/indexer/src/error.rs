use classmap_extractor::ExtractorError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Document discovery failed: {0}")]
    Discovery(String),

    #[error("Failed to read {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: ExtractorError,
    },

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Watcher error: {0}")]
    Watcher(String),
}
