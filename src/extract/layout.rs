//! Per-table label/value layout classification.

use serde::{Deserialize, Serialize};

use crate::extract::keywords::{normalize_matching, KeywordIndex};
use crate::model::Grid;

/// How a table arranges labels and values.
///
/// Decided once per table by a pure function of the grid. Per-cell
/// re-derivation would occasionally be more accurate but makes the
/// mapper's behavior much harder to reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Value in the cell to the right of its label
    #[default]
    LabelLeft,
    /// Value in the cell below its label
    LabelAbove,
    /// Label and value share one cell, separated by a colon
    LabelValueSameCell,
}

/// Classify a grid's layout.
///
/// Every keyword-bearing cell votes: trailing text after the keyword
/// and a separator votes same-cell, a populated right neighbor votes
/// label-left, a populated below neighbor votes label-above. One
/// same-cell vote decides the table outright; otherwise the majority
/// wins and ties default to label-left.
pub fn classify(grid: &Grid, keywords: &KeywordIndex, source_id: &str, table_idx: usize) -> LayoutKind {
    let mut left_votes = 0usize;
    let mut above_votes = 0usize;
    let mut same_cell_votes = 0usize;

    for (r, c, cell) in grid.iter() {
        if cell.is_covered(r, c) {
            continue;
        }
        let Some(keyword) = keywords.longest_match(&cell.text) else {
            continue;
        };

        if has_inline_value(&cell.text, keyword) {
            same_cell_votes += 1;
            continue;
        }

        // A populated neighbor that is itself a label never votes; in
        // label-above tables the right neighbor is the next label.
        let right = grid.cell(r, c + 1).is_some_and(|n| {
            !n.is_blank() && n.origin_col != cell.origin_col && !keywords.matches(&n.text)
        });
        let below = grid.cell(r + 1, c).is_some_and(|n| {
            !n.is_blank() && n.origin_row != cell.origin_row && !keywords.matches(&n.text)
        });
        if right {
            left_votes += 1;
        } else if below {
            above_votes += 1;
        }
    }

    let kind = if same_cell_votes > 0 {
        LayoutKind::LabelValueSameCell
    } else if above_votes > left_votes {
        LayoutKind::LabelAbove
    } else {
        LayoutKind::LabelLeft
    };

    log::debug!(
        "{source_id}: table {table_idx} layout {kind:?} \
         (same-cell {same_cell_votes}, left {left_votes}, above {above_votes})"
    );
    kind
}

/// Check for non-empty text after the keyword and a colon separator.
fn has_inline_value(text: &str, keyword: &str) -> bool {
    let normalized = normalize_matching(text);
    let Some(pos) = normalized.find(keyword) else {
        return false;
    };
    let rest = &normalized[pos + keyword.len()..];
    let Some(stripped) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) else {
        return false;
    };
    !stripped.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::config::ExtractConfig;
    use crate::model::{Table, TableRow};
    use crate::extract::grid_builder::GridBuilder;

    fn grid_of(rows: &[&[&str]]) -> Grid {
        let mut table = Table::new();
        for row in rows {
            table.add_row(TableRow::from_strings(row.iter().copied()));
        }
        let config = ExtractConfig::default();
        let keywords = KeywordIndex::new(&config);
        GridBuilder::new(&keywords, config.min_label_chars).build(&table, "test.docx", 0)
    }

    fn classify_grid(grid: &Grid) -> LayoutKind {
        let config = ExtractConfig::default();
        let keywords = KeywordIndex::new(&config);
        classify(grid, &keywords, "test.docx", 0)
    }

    #[test]
    fn test_label_left() {
        let grid = grid_of(&[&["姓名", "张三"], &["性别", "男"]]);
        assert_eq!(classify_grid(&grid), LayoutKind::LabelLeft);
    }

    #[test]
    fn test_label_above() {
        let grid = grid_of(&[
            &["姓名", "性别", "学号"],
            &["张三", "男", "20240101"],
        ]);
        assert_eq!(classify_grid(&grid), LayoutKind::LabelAbove);
    }

    #[test]
    fn test_same_cell_takes_priority() {
        let grid = grid_of(&[&["姓名：张三", "性别", "男"]]);
        assert_eq!(classify_grid(&grid), LayoutKind::LabelValueSameCell);
    }

    #[test]
    fn test_tie_defaults_to_label_left() {
        // One left vote, one above vote
        let grid = grid_of(&[&["姓名", "张三"], &["学号", ""], &["20240101", ""]]);
        assert_eq!(classify_grid(&grid), LayoutKind::LabelLeft);
    }

    #[test]
    fn test_no_keywords_defaults_to_label_left() {
        let grid = grid_of(&[&["甲", "乙"], &["丙", "丁"]]);
        assert_eq!(classify_grid(&grid), LayoutKind::LabelLeft);
    }

    #[test]
    fn test_inline_value_detection() {
        assert!(has_inline_value("手机号：13800138000", "手机号"));
        assert!(has_inline_value("姓名: 张三", "姓名"));
        assert!(!has_inline_value("姓名：", "姓名"));
        assert!(!has_inline_value("姓名", "姓名"));
    }
}
