//! Block-level types produced by the document reader.

use serde::{Deserialize, Serialize};

/// A top-level content block in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// A plain-text paragraph
    Paragraph(Paragraph),
    /// A table of raw cells
    Table(Table),
}

impl Block {
    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(t) => t.plain_text(),
        }
    }

    /// Return the contained table, if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }
}

/// A paragraph of text runs, exactly as declared in markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Ordered text runs
    pub runs: Vec<String>,

    /// Paragraph style id, if declared
    pub style: Option<String>,
}

impl Paragraph {
    /// Create a paragraph with a single text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![text.into()],
            style: None,
        }
    }

    /// Append a text run.
    pub fn add_run(&mut self, text: impl Into<String>) {
        self.runs.push(text.into());
    }

    /// Get the concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.concat()
    }

    /// Check if the paragraph carries no text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.trim().is_empty())
    }
}

/// A table as declared in markup: rows of raw cells with span metadata.
///
/// No normalization happens at this level. Row order, cell order and
/// span declarations are preserved exactly; resolving them into a
/// rectangular grid is the grid builder's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows in declaration order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if any cell declares a span or continuation.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.row_span > 1 || c.col_span > 1 || c.continuation)
    }

    /// Get a tab/newline-joined text representation.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in declaration order
    pub cells: Vec<RawCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }

    /// Create a row of plain unspanned cells from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(RawCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A raw table cell with its span metadata as declared in markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCell {
    /// Raw text content (continuation cells carry none of their own)
    pub text: String,

    /// Number of rows this cell spans (>= 1)
    pub row_span: usize,

    /// Number of columns this cell spans (>= 1)
    pub col_span: usize,

    /// Placeholder continuing a vertical span from a preceding row
    pub continuation: bool,
}

impl RawCell {
    /// Create a plain unspanned cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row_span: 1,
            col_span: 1,
            continuation: false,
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Create a continuation placeholder for a vertical span.
    pub fn continuation() -> Self {
        Self {
            text: String::new(),
            row_span: 1,
            col_span: 1,
            continuation: true,
        }
    }

    /// Set the column span and return self.
    pub fn col_span(mut self, span: usize) -> Self {
        self.col_span = span.max(1);
        self
    }

    /// Set the row span and return self.
    pub fn row_span(mut self, span: usize) -> Self {
        self.row_span = span.max(1);
        self
    }

    /// Check if the cell text is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
