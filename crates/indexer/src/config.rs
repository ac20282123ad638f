use crate::error::{IndexerError, Result};
use crate::index::DedupOrder;
use classmap_extractor::ParseOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "classmap.toml";

/// Matcher family a document's language is routed to at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    Markup,
    Stylesheet,
    Script,
}

/// Project configuration, read from `classmap.toml` at the project root.
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassmapConfig {
    pub include_glob_pattern: String,
    pub exclude_glob_pattern: String,
    pub enable_external_stylesheet_support: bool,
    pub enable_emmet_support: bool,
    pub html_languages: Vec<String>,
    pub css_languages: Vec<String>,
    pub javascript_languages: Vec<String>,
    pub dedup_order: DedupOrder,
}

impl Default for ClassmapConfig {
    fn default() -> Self {
        Self {
            include_glob_pattern: "**/*.{css,html}".to_string(),
            exclude_glob_pattern: "**/node_modules/**".to_string(),
            enable_external_stylesheet_support: false,
            enable_emmet_support: false,
            html_languages: strings(&[
                "html", "htm", "vue", "razor", "blade", "hbs", "handlebars", "twig", "php",
                "md", "erb", "ejs", "svelte",
            ]),
            css_languages: strings(&["css", "sass", "scss"]),
            javascript_languages: strings(&["js", "jsx", "tsx"]),
            dedup_order: DedupOrder::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl ClassmapConfig {
    #[must_use]
    pub fn path_for_root(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Load the project config; a missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path_for_root(root);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text)
                .map_err(|e| IndexerError::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| IndexerError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IndexerError::Config(e.to_string()))
    }

    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            enable_external_stylesheet_support: self.enable_external_stylesheet_support,
        }
    }

    /// Whether moving from `previous` to `self` changes what a rebuild would
    /// discover or fetch.
    #[must_use]
    pub fn requires_rebuild(&self, previous: &Self) -> bool {
        self.include_glob_pattern != previous.include_glob_pattern
            || self.exclude_glob_pattern != previous.exclude_glob_pattern
            || self.enable_external_stylesheet_support != previous.enable_external_stylesheet_support
    }

    /// Family for a language identifier. Markup wins when an identifier is
    /// listed under several families.
    #[must_use]
    pub fn family_of(&self, language_id: &str) -> Option<LanguageFamily> {
        let listed = |list: &[String]| list.iter().any(|l| l.eq_ignore_ascii_case(language_id));
        if listed(&self.html_languages) {
            Some(LanguageFamily::Markup)
        } else if listed(&self.css_languages) {
            Some(LanguageFamily::Stylesheet)
        } else if listed(&self.javascript_languages) {
            Some(LanguageFamily::Script)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ClassmapConfig::from_toml_str(
            "enable_external_stylesheet_support = true\ndedup_order = \"discovery\"\n",
        )
        .unwrap();

        assert!(config.enable_external_stylesheet_support);
        assert_eq!(config.dedup_order, DedupOrder::Discovery);
        assert_eq!(config.include_glob_pattern, "**/*.{css,html}");
        assert_eq!(config.css_languages, vec!["css", "sass", "scss"]);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = ClassmapConfig::default();
        config.exclude_glob_pattern = "**/vendor/**".to_string();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ClassmapConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn unknown_value_is_config_error() {
        let err = ClassmapConfig::from_toml_str("dedup_order = \"random\"").unwrap_err();
        assert!(matches!(err, IndexerError::Config(_)));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ClassmapConfig::load(dir.path()).unwrap(), ClassmapConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "enable_emmet_support = true").unwrap();
        assert!(ClassmapConfig::load(dir.path()).unwrap().enable_emmet_support);
    }

    #[test]
    fn rebuild_only_for_discovery_settings() {
        let base = ClassmapConfig::default();

        let mut emmet = base.clone();
        emmet.enable_emmet_support = true;
        emmet.javascript_languages.push("ts".to_string());
        assert!(!emmet.requires_rebuild(&base));

        let mut external = base.clone();
        external.enable_external_stylesheet_support = true;
        assert!(external.requires_rebuild(&base));

        let mut include = base.clone();
        include.include_glob_pattern = "**/*.css".to_string();
        assert!(include.requires_rebuild(&base));
    }

    #[test]
    fn family_routing() {
        let config = ClassmapConfig::default();
        assert_eq!(config.family_of("HTML"), Some(LanguageFamily::Markup));
        assert_eq!(config.family_of("scss"), Some(LanguageFamily::Stylesheet));
        assert_eq!(config.family_of("tsx"), Some(LanguageFamily::Script));
        assert_eq!(config.family_of("rs"), None);
    }
}
