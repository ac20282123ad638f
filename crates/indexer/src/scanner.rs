use crate::config::ClassmapConfig;
use crate::error::{IndexerError, Result};
use crate::provider::{DocumentProvider, DocumentRef};
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use walkdir::{DirEntry, WalkDir};

const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Finds documents under a project root using include/exclude glob patterns
/// matched against root-relative paths.
///
/// Clones share their patterns, so [`WorkspaceScanner::set_patterns`] on one
/// handle affects every later scan.
#[derive(Debug, Clone)]
pub struct WorkspaceScanner {
    root: PathBuf,
    patterns: Arc<RwLock<Patterns>>,
}

#[derive(Debug, Clone)]
struct Patterns {
    include: GlobSet,
    exclude: GlobSet,
}

impl Patterns {
    fn new(include: &str, exclude: &str) -> Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    fn is_candidate(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

impl WorkspaceScanner {
    pub fn new(root: impl AsRef<Path>, include: &str, exclude: &str) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            patterns: Arc::new(RwLock::new(Patterns::new(include, exclude)?)),
        })
    }

    pub fn from_config(root: impl AsRef<Path>, config: &ClassmapConfig) -> Result<Self> {
        Self::new(
            root,
            &config.include_glob_pattern,
            &config.exclude_glob_pattern,
        )
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the include/exclude patterns. Invalid patterns leave the
    /// current ones in place.
    pub fn set_patterns(&self, include: &str, exclude: &str) -> Result<()> {
        let patterns = Patterns::new(include, exclude)?;
        *self
            .patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner) = patterns;
        Ok(())
    }

    fn patterns(&self) -> Patterns {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All matching files, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(IndexerError::Discovery(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let patterns = self.patterns();
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_skipped_dir(entry, &patterns));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if entry.file_type().is_file() && patterns.is_candidate(self.relative(entry.path())) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Whether a file path passes the include and exclude patterns.
    #[must_use]
    pub fn is_candidate(&self, path: &Path) -> bool {
        self.patterns().is_candidate(self.relative(path))
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn is_skipped_dir(&self, entry: &DirEntry, patterns: &Patterns) -> bool {
        if !entry.file_type().is_dir() || entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if VCS_DIRS.contains(&name.as_ref()) {
            return true;
        }
        // A directory is pruned when anything inside it would be excluded.
        patterns.exclude.is_match(self.relative(entry.path()).join("_"))
    }
}

fn build_globset(pattern: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let pattern = pattern.trim();
    if !pattern.is_empty() {
        let glob = Glob::new(pattern)
            .map_err(|e| IndexerError::Config(format!("invalid glob {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| IndexerError::Config(format!("invalid glob {pattern:?}: {e}")))
}

#[async_trait]
impl DocumentProvider for WorkspaceScanner {
    async fn find_all_parseable_documents(&self) -> Result<Vec<DocumentRef>> {
        let scanner = self.clone();
        let files = tokio::task::spawn_blocking(move || scanner.scan())
            .await
            .map_err(|e| IndexerError::Discovery(format!("scan task failed: {e}")))??;
        Ok(files.into_iter().map(DocumentRef::from_path).collect())
    }

    async fn read_document(&self, document: &DocumentRef) -> std::io::Result<String> {
        tokio::fs::read_to_string(&document.path).await
    }

    fn reconfigure(&self, config: &ClassmapConfig) -> Result<()> {
        self.set_patterns(&config.include_glob_pattern, &config.exclude_glob_pattern)
    }
}
