//! # Classmap Query
//!
//! Answers editor-style questions against a published [`ClassIndex`]
//! snapshot: is the cursor inside a class attribute, which classes can be
//! completed there, and where is the class under the cursor defined.
//!
//! ```
//! use classmap_extractor::ClassDefinition;
//! use classmap_indexer::ClassIndex;
//! use classmap_query::{complete, ClassAttributeMatcher};
//!
//! let index = ClassIndex::from_definitions([
//!     ClassDefinition::new("btn"),
//!     ClassDefinition::new("card"),
//! ]);
//! let line = r#"<div class="btn "#;
//! let items = complete(&index, line, line.len(), &ClassAttributeMatcher::markup()).unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].label, "card");
//! ```
//!
//! [`ClassIndex`]: classmap_indexer::ClassIndex

mod attribute;
mod completion;
mod definition;
mod error;
mod matcher;

pub use attribute::scan;
pub use completion::{complete, complete_with, CompletionItem};
pub use definition::{find_definition, word_at};
pub use error::{QueryError, Result};
pub use matcher::{ClassAttributeMatcher, MatcherSet, PatternMatcher};
