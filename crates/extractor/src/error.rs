use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractorError>;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Grammar error: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Failed to parse {what}")]
    Parse { what: String },

    #[error("Failed to fetch {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("Failed to parse stylesheet fetched from {url}: {reason}")]
    RemoteParse { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ExtractorError {
    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(language.into())
    }

    pub fn parse(what: impl Into<String>) -> Self {
        Self::Parse { what: what.into() }
    }

    pub fn remote_fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::RemoteFetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
