use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a class definition was found: a workspace file or a remote stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SourceRef {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Zero-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub source: SourceRef,
    pub range: Range,
}

/// One CSS class name discovered in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub class_name: String,

    /// Documentation comments written in front of the rule, in source order.
    /// `None` rather than an empty list when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,

    /// Absent when the source or the rule position is unknown; such definitions
    /// still serve name lookups but never resolve as a definition target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ClassDefinition {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            comments: None,
            location: None,
        }
    }

    /// First line of the first documentation comment.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.comments
            .as_ref()
            .and_then(|comments| comments.first())
            .map(|comment| comment.lines().next().unwrap_or(""))
    }
}
