//! Mapping grid cells to canonical record fields.

use std::collections::HashMap;

use regex::Regex;

use crate::extract::checkbox::CheckboxClassifier;
use crate::extract::config::{ExtractConfig, FieldKind, FieldSpec};
use crate::extract::keywords::{normalize_display, normalize_matching, KeywordIndex};
use crate::extract::layout::LayoutKind;
use crate::model::{CheckState, FieldValue, Grid, LogicalCell, Record};

/// Maps a grid's cells to canonical fields using the configured
/// keyword dictionary and the table's layout.
pub struct FieldMapper<'a> {
    config: &'a ExtractConfig,
    keywords: KeywordIndex,
    checkbox: CheckboxClassifier,
    /// Precompiled `keyword [:：] value` patterns, keyed by keyword
    inline: HashMap<String, Regex>,
}

impl<'a> FieldMapper<'a> {
    /// Create a mapper over a configuration.
    pub fn new(config: &'a ExtractConfig) -> Self {
        let mut inline = HashMap::new();
        for field in &config.fields {
            for keyword in &field.keywords {
                let keyword = keyword.replace(' ', "");
                let pattern = format!(r"{}\s*[:：]\s*(.+)", regex::escape(&keyword));
                if let Ok(re) = Regex::new(&pattern) {
                    inline.insert(keyword, re);
                }
            }
        }
        Self {
            config,
            keywords: KeywordIndex::new(config),
            checkbox: CheckboxClassifier::new(config.checkbox.clone()),
            inline,
        }
    }

    /// The keyword index shared with the other pipeline stages.
    pub fn keywords(&self) -> &KeywordIndex {
        &self.keywords
    }

    /// Map one grid to a record.
    ///
    /// Cells matching no field are ignored silently; forms are full
    /// of decorative and instructional cells. Duplicate matches for a
    /// field apply last-write-wins in row-major scan order, flag the
    /// record and log a warning. Pure in the grid and layout: the same
    /// inputs always produce an identical record.
    pub fn map(
        &self,
        grid: &Grid,
        layout: LayoutKind,
        source_id: &str,
        table_idx: usize,
    ) -> Record {
        let mut record = Record::new(source_id);

        for (r, c, cell) in grid.iter() {
            // Replicated span copies would re-match their origin
            if cell.is_covered(r, c) || cell.is_blank() {
                continue;
            }
            let Some((field, keyword)) = self.match_field(&cell.text) else {
                continue;
            };

            let value = match field.kind {
                FieldKind::Text => self
                    .extract_text(grid, layout, r, c, cell, field, &keyword)
                    .map(FieldValue::Text),
                FieldKind::Checkbox => {
                    let state = self.extract_check(grid, layout, r, c, cell, field, &keyword);
                    if state == CheckState::Unknown {
                        log::warn!(
                            "{source_id}: table {table_idx} checkbox {} at row {r}, \
                             col {c} resolved to unknown",
                            field.name
                        );
                    }
                    Some(FieldValue::Check(state))
                }
            };
            let Some(value) = value else { continue };

            if record.set(&field.name, value).is_some() {
                log::warn!(
                    "{source_id}: table {table_idx} ambiguous field {} re-matched at \
                     row {r}, col {c}; keeping the later value",
                    field.name
                );
                record.flag_ambiguous(&field.name);
            }
        }

        if record.is_empty() {
            log::debug!("{source_id}: table {table_idx} matched no fields");
        }
        record
    }

    /// First configured field with a keyword in the cell text, plus
    /// the longest such keyword for inline extraction.
    fn match_field(&self, text: &str) -> Option<(&FieldSpec, String)> {
        let normalized = normalize_matching(text);
        if normalized.is_empty() {
            return None;
        }
        for field in &self.config.fields {
            let keyword = field
                .keywords
                .iter()
                .map(|k| k.replace(' ', ""))
                .filter(|k| normalized.contains(k.as_str()))
                .max_by_key(|k| k.chars().count());
            if let Some(keyword) = keyword {
                return Some((field, keyword));
            }
        }
        None
    }

    /// Extract a text value for a matched label cell. An inline value
    /// wins under every layout (source forms mix inline and adjacent
    /// values within one table), then the layout's adjacent
    /// cell is consulted.
    fn extract_text(
        &self,
        grid: &Grid,
        layout: LayoutKind,
        row: usize,
        col: usize,
        cell: &LogicalCell,
        field: &FieldSpec,
        keyword: &str,
    ) -> Option<String> {
        self.inline_value(&cell.text, keyword)
            .or_else(|| self.adjacent_value(grid, layout, row, col, cell, field))
            .filter(|v| !v.is_empty())
    }

    /// Extract a checkbox state: the label cell itself first (the
    /// symbol often sits inline with the label), then the value cell.
    fn extract_check(
        &self,
        grid: &Grid,
        layout: LayoutKind,
        row: usize,
        col: usize,
        cell: &LogicalCell,
        field: &FieldSpec,
        keyword: &str,
    ) -> CheckState {
        let remainder = normalize_matching(&cell.text).replace(keyword, "");
        let state = self.checkbox.classify(&remainder);
        if state != CheckState::Unknown {
            return state;
        }
        match self
            .inline_value(&cell.text, keyword)
            .or_else(|| self.adjacent_value(grid, layout, row, col, cell, field))
        {
            Some(value) => self.checkbox.classify(&value),
            None => CheckState::Unknown,
        }
    }

    /// Same-cell value after the keyword and a colon separator.
    fn inline_value(&self, text: &str, keyword: &str) -> Option<String> {
        let re = self.inline.get(keyword)?;
        let display = normalize_display(text);
        re.captures(&display)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First usable neighbor: rightward along the row for label-left,
    /// downward along the column for label-above, with the other
    /// direction as a fallback for ragged forms. Candidates that are
    /// blank, replicated copies of the label's own span, or labels of
    /// some other field are rejected.
    fn adjacent_value(
        &self,
        grid: &Grid,
        layout: LayoutKind,
        row: usize,
        col: usize,
        cell: &LogicalCell,
        field: &FieldSpec,
    ) -> Option<String> {
        let accept = |r: usize, c: usize| -> Option<String> {
            let candidate = grid.cell(r, c)?;
            if candidate.origin_row == cell.origin_row && candidate.origin_col == cell.origin_col {
                return None;
            }
            let display = normalize_display(&candidate.text);
            if display.is_empty() || self.is_other_label(&candidate.text, field) {
                return None;
            }
            Some(display)
        };

        let scan_right = || (col + 1..grid.column_count()).find_map(|c| accept(row, c));
        let scan_down = || (row + 1..grid.row_count()).find_map(|r| accept(r, col));

        match layout {
            LayoutKind::LabelAbove => scan_down().or_else(scan_right),
            LayoutKind::LabelLeft | LayoutKind::LabelValueSameCell => {
                scan_right().or_else(scan_down)
            }
        }
    }

    /// Check whether text reads as the label of a different field.
    /// The matched field's own keywords are exempt so a value that
    /// echoes its label ("电话13800...") still qualifies.
    fn is_other_label(&self, text: &str, field: &FieldSpec) -> bool {
        let normalized = normalize_matching(text);
        self.config
            .fields
            .iter()
            .filter(|f| f.name != field.name)
            .flat_map(|f| f.keywords.iter())
            .any(|k| normalized.contains(k.replace(' ', "").as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::grid_builder::GridBuilder;
    use crate::model::{RawCell, Table, TableRow};

    fn grid_of(config: &ExtractConfig, rows: &[&[&str]]) -> Grid {
        let mut table = Table::new();
        for row in rows {
            table.add_row(TableRow::from_strings(row.iter().copied()));
        }
        let keywords = KeywordIndex::new(config);
        GridBuilder::new(&keywords, config.min_label_chars).build(&table, "test.docx", 0)
    }

    #[test]
    fn test_label_left_mapping() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["姓名", "张三"], &["性别", "男"]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(record.text("姓名"), "张三");
        assert_eq!(record.text("性别"), "男");
        assert!(record.ambiguous.is_empty());
    }

    #[test]
    fn test_label_above_mapping() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["姓名", "学号"], &["李四", "20240101"]]);

        let record = mapper.map(&grid, LayoutKind::LabelAbove, "test.docx", 0);
        assert_eq!(record.text("姓名"), "李四");
        assert_eq!(record.text("学号"), "20240101");
    }

    #[test]
    fn test_same_cell_mapping() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["手机号：13800138000"]]);

        let record = mapper.map(&grid, LayoutKind::LabelValueSameCell, "test.docx", 0);
        assert_eq!(record.text("联系方式"), "13800138000");
    }

    #[test]
    fn test_checkbox_inline_symbol() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["服从分配 ☑"]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(
            record.get("服从分配").and_then(|v| v.as_check()),
            Some(CheckState::Checked)
        );
    }

    #[test]
    fn test_checkbox_adjacent_cell() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["服从分配", "☐"]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(
            record.get("服从分配").and_then(|v| v.as_check()),
            Some(CheckState::Unchecked)
        );
    }

    #[test]
    fn test_checkbox_without_symbol_is_unknown() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["服从分配", ""]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(
            record.get("服从分配").and_then(|v| v.as_check()),
            Some(CheckState::Unknown)
        );
    }

    #[test]
    fn test_last_write_wins_flags_ambiguity() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(
            &config,
            &[&["姓名", "张三"], &["姓名", "李四"]],
        );

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        // Row-major scan: the later cell wins
        assert_eq!(record.text("姓名"), "李四");
        assert_eq!(record.ambiguous, vec!["姓名".to_string()]);
    }

    #[test]
    fn test_merged_label_not_matched_twice() {
        let config = ExtractConfig::default();
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![
            RawCell::text("姓名").col_span(2),
            RawCell::text("张三"),
        ]));
        let keywords = KeywordIndex::new(&config);
        let grid =
            GridBuilder::new(&keywords, config.min_label_chars).build(&table, "test.docx", 0);

        let mapper = FieldMapper::new(&config);
        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(record.text("姓名"), "张三");
        assert!(record.ambiguous.is_empty());
    }

    #[test]
    fn test_value_scan_skips_other_labels() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        // The label's right neighbor is another label; its value sits
        // further right
        let grid = grid_of(&config, &[&["姓名", "性别", "男"]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(record.text("性别"), "男");
        // 姓名's rightward scan rejects the 性别 label and lands on
        // the next populated cell
        assert_eq!(record.text("姓名"), "男");
    }

    #[test]
    fn test_unmatched_cells_are_ignored() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["请如实填写", "装饰"]]);

        let record = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let config = ExtractConfig::default();
        let mapper = FieldMapper::new(&config);
        let grid = grid_of(&config, &[&["姓名", "张三"], &["服从分配", "☑"]]);

        let first = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        let second = mapper.map(&grid, LayoutKind::LabelLeft, "test.docx", 0);
        assert_eq!(first, second);
    }
}
