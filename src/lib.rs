//! # formgrid
//!
//! Structured form-record extraction from DOCX tables.
//!
//! This library parses table-bearing Word documents and normalizes
//! semi-structured registration forms into canonical key-value
//! records, ready for spreadsheet export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use formgrid::{extract_file, ExtractConfig};
//!
//! fn main() -> formgrid::Result<()> {
//!     let config = ExtractConfig::default();
//!     let record = extract_file("form.docx", &config)?;
//!     println!("{}", record.text("姓名"));
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **DocxReader**: document markup → paragraphs and raw tables
//! - **GridBuilder**: raw table → dense rectangular grid, spans resolved
//! - **Layout classification**: label-left / label-above / same-cell
//! - **FieldMapper**: grid cells → canonical record fields
//! - **CheckboxClassifier**: ternary checked / unchecked / unknown
//!
//! Batch processing over a directory (with one-level zip bundle
//! extraction) is embarrassingly parallel and isolates malformed
//! documents instead of aborting.

pub mod batch;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{
    collect_records, collect_sources, process, process_document, process_with_progress,
    DocumentOutcome, DocumentSource,
};
pub use error::{Error, Result};
pub use extract::{
    CheckboxClassifier, CheckboxSymbols, ExtractConfig, FieldKind, FieldMapper, FieldSpec,
    GridBuilder, KeywordIndex, LayoutKind,
};
pub use model::{
    Block, CheckState, FieldValue, Grid, LogicalCell, Paragraph, RawCell, Record, Table, TableRow,
};
pub use parser::DocxReader;
pub use render::{to_csv, to_json, write_csv, JsonFormat};

use std::path::Path;

/// Extract one record from a docx file.
pub fn extract_file<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<Record> {
    let reader = DocxReader::open(path)?;
    let blocks = reader.parse()?;
    extract_blocks(&blocks, config, reader.source_id())
}

/// Extract one record from docx bytes.
pub fn extract_bytes(data: &[u8], config: &ExtractConfig) -> Result<Record> {
    let reader = DocxReader::from_bytes(data.to_vec());
    let blocks = reader.parse()?;
    extract_blocks(&blocks, config, reader.source_id())
}

/// Extract one record from already-parsed blocks.
///
/// The record comes from the first table yielding at least one
/// populated field, falling back to an empty record.
pub fn extract_blocks(blocks: &[Block], config: &ExtractConfig, source_id: &str) -> Result<Record> {
    let mut empty = None;
    for (table_idx, table) in blocks.iter().filter_map(|b| b.as_table()).enumerate() {
        let record = extract::extract_table(table, config, source_id, table_idx);
        if !record.is_empty() {
            return Ok(record);
        }
        empty.get_or_insert(record);
    }
    Ok(empty.unwrap_or_else(|| Record::new(source_id)))
}

/// Run the full batch pipeline over a directory and return records in
/// source-id order.
pub fn extract_dir<P: AsRef<Path>>(dir: P, config: &ExtractConfig) -> Result<Vec<Record>> {
    let sources = collect_sources(dir)?;
    let outcomes = process(&sources, config, true);
    Ok(collect_records(outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bytes_rejects_garbage() {
        let result = extract_bytes(b"not a docx", &ExtractConfig::default());
        assert!(matches!(result, Err(Error::MalformedDocument { .. })));
    }

    #[test]
    fn test_extract_blocks_without_tables() {
        let blocks = vec![Block::Paragraph(Paragraph::with_text("报名表"))];
        let record = extract_blocks(&blocks, &ExtractConfig::default(), "p.docx").unwrap();
        assert!(record.is_empty());
        assert_eq!(record.source, "p.docx");
    }
}
