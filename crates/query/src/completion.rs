use crate::attribute::scan;
use crate::matcher::ClassAttributeMatcher;
use classmap_indexer::ClassIndex;
use serde::Serialize;

/// One completion candidate built from an indexed class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub insert_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Completions for the cursor position, or `None` outside a class attribute.
///
/// Classes already present in the attribute are left out.
pub fn complete(
    index: &ClassIndex,
    line: &str,
    cursor: usize,
    matcher: &ClassAttributeMatcher,
) -> Option<Vec<CompletionItem>> {
    let present = scan(line, cursor, matcher)?;
    let prefix = matcher.prefix();

    let items = index
        .iter()
        .filter_map(|definition| {
            let insert_text = format!("{prefix}{}", definition.class_name);
            if present.contains(&insert_text) {
                return None;
            }
            Some(CompletionItem {
                label: definition.class_name.clone(),
                insert_text,
                detail: definition.summary().map(str::to_string),
            })
        })
        .collect();

    Some(items)
}

/// Completions from the first matcher that recognizes the context.
pub fn complete_with(
    index: &ClassIndex,
    line: &str,
    cursor: usize,
    matchers: &[ClassAttributeMatcher],
) -> Option<Vec<CompletionItem>> {
    matchers
        .iter()
        .find_map(|matcher| complete(index, line, cursor, matcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use classmap_extractor::ClassDefinition;
    use pretty_assertions::assert_eq;

    fn index() -> ClassIndex {
        ClassIndex::from_definitions([
            ClassDefinition {
                comments: Some(vec!["Primary action\nUse once per view".to_string()]),
                ..ClassDefinition::new("btn")
            },
            ClassDefinition::new("card"),
            ClassDefinition::new("hidden"),
        ])
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn excludes_classes_already_present() {
        let line = r#"<div class="card "#;
        let items = complete(&index(), line, line.len(), &ClassAttributeMatcher::markup()).unwrap();
        assert_eq!(labels(&items), vec!["btn", "hidden"]);
        assert_eq!(items[0].detail.as_deref(), Some("Primary action"));
        assert_eq!(items[1].detail, None);
    }

    #[test]
    fn prefix_applies_to_insert_text_and_exclusion() {
        let line = "  @apply .btn ";
        let items = complete(&index(), line, line.len(), &ClassAttributeMatcher::stylesheet_apply())
            .unwrap();
        assert_eq!(labels(&items), vec!["card", "hidden"]);
        assert_eq!(items[0].insert_text, ".card");
    }

    #[test]
    fn outside_attribute_yields_nothing() {
        let line = "<div id=\"";
        assert_eq!(complete(&index(), line, line.len(), &ClassAttributeMatcher::markup()), None);
    }

    #[test]
    fn first_recognizing_matcher_wins() {
        let matchers = [ClassAttributeMatcher::markup(), ClassAttributeMatcher::emmet()];
        let items = complete_with(&index(), "div.card.", 9, &matchers).unwrap();
        assert_eq!(labels(&items), vec!["btn", "hidden"]);
    }
}
