//! The extraction pipeline: grid building, layout classification,
//! field mapping and checkbox interpretation.
//!
//! Each stage is a pure function of its inputs plus the read-only
//! [`ExtractConfig`]; diagnostics go through the `log` facade.

mod checkbox;
mod config;
mod grid_builder;
mod keywords;
mod layout;
mod mapper;

pub use checkbox::CheckboxClassifier;
pub use config::{CheckOutput, CheckboxSymbols, ExtractConfig, FieldKind, FieldSpec};
pub use grid_builder::GridBuilder;
pub use keywords::KeywordIndex;
pub use layout::{classify, LayoutKind};
pub use mapper::FieldMapper;

use crate::model::{Record, Table};

/// Run the full per-table pipeline: grid build, layout classification,
/// field mapping.
pub fn extract_table(
    table: &Table,
    config: &ExtractConfig,
    source_id: &str,
    table_idx: usize,
) -> Record {
    let mapper = FieldMapper::new(config);
    let builder = GridBuilder::new(mapper.keywords(), config.min_label_chars);
    let grid = builder.build(table, source_id, table_idx);
    let layout = classify(&grid, mapper.keywords(), source_id, table_idx);
    mapper.map(&grid, layout, source_id, table_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_extract_table_end_to_end() {
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["姓名", "张三", "性别", "男"]));
        table.add_row(TableRow::from_strings(["学号", "20240101", "服从分配", "☑"]));

        let record = extract_table(&table, &ExtractConfig::default(), "demo.docx", 0);
        assert_eq!(record.text("姓名"), "张三");
        assert_eq!(record.text("性别"), "男");
        assert_eq!(record.text("学号"), "20240101");
        assert_eq!(
            record.get("服从分配").and_then(|v| v.as_check()),
            Some(crate::model::CheckState::Checked)
        );
    }
}
