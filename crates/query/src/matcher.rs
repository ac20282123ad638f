use crate::error::{QueryError, Result};
use classmap_indexer::LanguageFamily;
use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class=["']([\w\-@:/ ]*)$"#).expect("Invalid markup class regex"));

static APPLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@apply ([.\w\-@:/ ]*)$").expect("Invalid @apply regex"));

static EMMET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.[\w\-@:/. ]*)$").expect("Invalid emmet regex"));

static SCRIPT_DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class(?:Name)?=["']([\w\- ]*)$"#).expect("Invalid script definition regex")
});

/// Regex-driven attribute context: the first capture group holds the class
/// tokens typed so far.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
    split: String,
    prefix: String,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| QueryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(QueryError::MissingCaptureGroup(pattern.to_string()));
        }
        Ok(Self::from_regex(regex))
    }

    fn from_regex(regex: Regex) -> Self {
        Self {
            regex,
            split: " ".to_string(),
            prefix: String::new(),
        }
    }

    #[must_use]
    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = split.into();
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub fn split(&self) -> &str {
        &self.split
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// How the scanner decides whether a cursor sits in a class attribute.
#[derive(Debug, Clone)]
pub enum ClassAttributeMatcher {
    Pattern(PatternMatcher),
    /// `class=`/`className=` attributes, including string literals inside
    /// `className={...}` expressions.
    MarkupAttribute,
}

impl ClassAttributeMatcher {
    pub fn pattern(pattern: &str) -> Result<Self> {
        PatternMatcher::new(pattern).map(Self::Pattern)
    }

    /// `class="..."` in markup.
    pub fn markup() -> Self {
        Self::Pattern(PatternMatcher::from_regex(MARKUP_CLASS_RE.clone()))
    }

    /// `@apply ...` in stylesheets; completions carry a leading dot.
    pub fn stylesheet_apply() -> Self {
        Self::Pattern(PatternMatcher::from_regex(APPLY_RE.clone()).with_prefix("."))
    }

    /// JSX-style `class`/`className` attributes.
    pub const fn script() -> Self {
        Self::MarkupAttribute
    }

    /// Emmet abbreviations such as `div.card.card--wide`.
    pub fn emmet() -> Self {
        Self::Pattern(PatternMatcher::from_regex(EMMET_RE.clone()).with_split("."))
    }

    /// Definition lookup context in script files.
    pub fn script_definition() -> Self {
        Self::Pattern(PatternMatcher::from_regex(SCRIPT_DEFINITION_RE.clone()))
    }

    /// Text prepended to class names when completing.
    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::Pattern(pattern) => pattern.prefix(),
            Self::MarkupAttribute => "",
        }
    }
}

/// Matchers used for one language family, tried in order.
#[derive(Debug, Clone)]
pub struct MatcherSet {
    pub completion: Vec<ClassAttributeMatcher>,
    pub definition: Vec<ClassAttributeMatcher>,
}

impl MatcherSet {
    pub fn for_family(family: LanguageFamily, enable_emmet: bool) -> Self {
        match family {
            LanguageFamily::Markup => {
                let mut completion = vec![ClassAttributeMatcher::markup()];
                if enable_emmet {
                    completion.push(ClassAttributeMatcher::emmet());
                }
                Self {
                    completion,
                    definition: vec![ClassAttributeMatcher::markup()],
                }
            }
            LanguageFamily::Stylesheet => Self {
                completion: vec![ClassAttributeMatcher::stylesheet_apply()],
                definition: vec![ClassAttributeMatcher::stylesheet_apply()],
            },
            LanguageFamily::Script => {
                let mut completion = vec![ClassAttributeMatcher::script()];
                if enable_emmet {
                    completion.push(ClassAttributeMatcher::emmet());
                }
                Self {
                    completion,
                    definition: vec![ClassAttributeMatcher::script_definition()],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_patterns() {
        assert!(matches!(
            ClassAttributeMatcher::pattern("class=(["),
            Err(QueryError::InvalidPattern { .. })
        ));
        assert!(matches!(
            ClassAttributeMatcher::pattern("class=\"[a-z ]*$"),
            Err(QueryError::MissingCaptureGroup(_))
        ));
        assert!(ClassAttributeMatcher::pattern(r#"class="([\w ]*)$"#).is_ok());
    }

    #[test]
    fn presets_carry_prefix_and_split() {
        assert_eq!(ClassAttributeMatcher::stylesheet_apply().prefix(), ".");
        assert_eq!(ClassAttributeMatcher::markup().prefix(), "");
        let ClassAttributeMatcher::Pattern(emmet) = ClassAttributeMatcher::emmet() else {
            panic!("emmet is a pattern matcher");
        };
        assert_eq!(emmet.split(), ".");
    }

    #[test]
    fn emmet_only_when_enabled() {
        assert_eq!(MatcherSet::for_family(LanguageFamily::Markup, false).completion.len(), 1);
        assert_eq!(MatcherSet::for_family(LanguageFamily::Script, true).completion.len(), 2);
        assert_eq!(MatcherSet::for_family(LanguageFamily::Stylesheet, true).completion.len(), 1);
    }
}
