use classmap_extractor::ClassDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which definition survives when several share a class name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupOrder {
    /// First definition from the first document to finish parsing.
    #[default]
    Completion,
    /// First definition in document discovery order, then in-document order.
    Discovery,
}

/// Published index snapshot: one definition per class name, iterable in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    definitions: Vec<ClassDefinition>,
    by_name: HashMap<String, usize>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from definitions, keeping the first occurrence of each name.
    pub fn from_definitions(definitions: impl IntoIterator<Item = ClassDefinition>) -> Self {
        let mut index = Self::new();
        for definition in definitions {
            if index.by_name.contains_key(&definition.class_name) {
                continue;
            }
            index
                .by_name
                .insert(definition.class_name.clone(), index.definitions.len());
            index.definitions.push(definition);
        }
        index
    }

    #[must_use]
    pub fn get(&self, class_name: &str) -> Option<&ClassDefinition> {
        self.by_name
            .get(class_name)
            .map(|&position| &self.definitions[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn definitions(&self) -> &[ClassDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
