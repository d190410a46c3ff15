//! Keyword matching against normalized cell text.

use crate::extract::config::ExtractConfig;

/// Collapse runs of whitespace to single spaces, for display values.
pub(crate) fn normalize_display(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip all whitespace, for keyword matching.
pub(crate) fn normalize_matching(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Flattened, normalized view of every configured label keyword.
///
/// Shared by the grid builder (split-label repair), the layout
/// classifier (keyword-bearing cells) and the field mapper (candidate
/// value rejection).
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    keywords: Vec<String>,
}

impl KeywordIndex {
    /// Build the index from a configuration.
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            keywords: config.all_keywords(),
        }
    }

    /// Check whether the normalized text contains any label keyword.
    pub fn matches(&self, text: &str) -> bool {
        let normalized = normalize_matching(text);
        if normalized.is_empty() {
            return false;
        }
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }

    /// Find the longest keyword contained in the normalized text.
    ///
    /// Longest-first keeps "联系电话" from being claimed by "电话"
    /// when both are configured.
    pub fn longest_match<'a>(&'a self, text: &str) -> Option<&'a str> {
        let normalized = normalize_matching(text);
        self.keywords
            .iter()
            .filter(|k| normalized.contains(k.as_str()))
            .max_by_key(|k| k.chars().count())
            .map(|k| k.as_str())
    }
}
