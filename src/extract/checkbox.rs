//! Ternary checkbox interpretation.

use crate::extract::config::CheckboxSymbols;
use crate::model::CheckState;

/// Classifies cell text as checked, unchecked or unknown by testing
/// membership in two disjoint symbol sets.
///
/// Total over all inputs: every string maps to exactly one
/// [`CheckState`], and contradictory text resolves to `Unknown` rather
/// than guessing.
pub struct CheckboxClassifier {
    symbols: CheckboxSymbols,
}

impl CheckboxClassifier {
    /// Create a classifier over the given symbol sets.
    pub fn new(symbols: CheckboxSymbols) -> Self {
        Self { symbols }
    }

    /// Classify a cell's text.
    ///
    /// The whitespace-stripped text is first tested for an exact match
    /// against either set; failing that, a containment scan covers
    /// cells with stray surrounding text. Only glyph symbols ("☑",
    /// "□", ...) take part in the containment scan; word stand-ins
    /// like "同意" only count as an exact match, otherwise a label
    /// such as "是否服从" would read as checked. Symbols from both
    /// sets in one cell resolve to `Unknown` with a warning.
    pub fn classify(&self, text: &str) -> CheckState {
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return CheckState::Unknown;
        }

        if self.symbols.checked.iter().any(|s| *s == stripped) {
            return CheckState::Checked;
        }
        if self.symbols.unchecked.iter().any(|s| *s == stripped) {
            return CheckState::Unchecked;
        }

        let has_checked = self
            .symbols
            .checked
            .iter()
            .any(|s| is_glyph(s) && stripped.contains(s));
        let has_unchecked = self
            .symbols
            .unchecked
            .iter()
            .any(|s| is_glyph(s) && stripped.contains(s));

        match (has_checked, has_unchecked) {
            (true, true) => {
                log::warn!("contradictory checkbox text {stripped:?}, resolving to unknown");
                CheckState::Unknown
            }
            (true, false) => CheckState::Checked,
            (false, true) => CheckState::Unchecked,
            (false, false) => CheckState::Unknown,
        }
    }
}

/// A symbol entry is glyph-like when it contains no letters or digits
/// (CJK ideographs are letters, so word stand-ins are excluded here).
fn is_glyph(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.chars().all(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CheckboxClassifier {
        CheckboxClassifier::new(CheckboxSymbols::default())
    }

    #[test]
    fn test_exact_symbols() {
        let c = classifier();
        assert_eq!(c.classify("☑"), CheckState::Checked);
        assert_eq!(c.classify(" ✔ "), CheckState::Checked);
        assert_eq!(c.classify("▲"), CheckState::Checked);
        assert_eq!(c.classify("☐"), CheckState::Unchecked);
        assert_eq!(c.classify("□"), CheckState::Unchecked);
    }

    #[test]
    fn test_affirmation_words() {
        let c = classifier();
        assert_eq!(c.classify("是"), CheckState::Checked);
        assert_eq!(c.classify("同意"), CheckState::Checked);
        assert_eq!(c.classify("不同意"), CheckState::Unchecked);
    }

    #[test]
    fn test_containment_with_stray_text() {
        let c = classifier();
        assert_eq!(c.classify("☑ 服从"), CheckState::Checked);
        assert_eq!(c.classify("选择：☐"), CheckState::Unchecked);
    }

    #[test]
    fn test_contradiction_is_unknown() {
        let c = classifier();
        assert_eq!(c.classify("☑ ☐"), CheckState::Unknown);
        assert_eq!(c.classify("■□"), CheckState::Unknown);
    }

    #[test]
    fn test_absence_is_unknown_not_unchecked() {
        let c = classifier();
        assert_eq!(c.classify(""), CheckState::Unknown);
        assert_eq!(c.classify("   "), CheckState::Unknown);
        assert_eq!(c.classify("随便写的内容"), CheckState::Unknown);
    }

    #[test]
    fn test_word_standins_only_match_exactly() {
        let c = classifier();
        // "是否..." is a question label, not an answer
        assert_eq!(c.classify("是否服从分配"), CheckState::Unknown);
        assert_eq!(c.classify("同意书"), CheckState::Unknown);
    }

    #[test]
    fn test_unconfigured_symbol_is_unknown() {
        // A hollow ballot-box variant outside the configured set
        let mut symbols = CheckboxSymbols::default();
        symbols.unchecked.retain(|s| s != "☐");
        let c = CheckboxClassifier::new(symbols);
        assert_eq!(c.classify("☐"), CheckState::Unknown);
    }
}
