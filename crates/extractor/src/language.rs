use crate::error::{ExtractorError, Result};
use std::path::Path;

/// Languages with a built-in parse engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Css,
    Html,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "css" => Self::Css,
            "html" | "htm" => Self::Html,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Html => "html",
            Self::Unknown => "unknown",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Self::Css => Ok(tree_sitter_css::LANGUAGE.into()),
            Self::Html => Ok(tree_sitter_html::LANGUAGE.into()),
            Self::Unknown => Err(ExtractorError::unsupported_language(self.as_str())),
        }
    }

    pub(crate) fn parser(self) -> Result<tree_sitter::Parser> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&self.tree_sitter_language()?)?;
        Ok(parser)
    }
}

/// Language identifier of a document: its lowercased file extension.
pub fn language_id_for_path(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}
