//! DOCX document reader.
//!
//! A `.docx` file is a zip archive whose main content lives in
//! `word/document.xml`. This reader streams that part with quick-xml
//! and produces an ordered list of [`Block`]s: paragraphs and tables
//! with their raw span metadata (`w:gridSpan`, `w:vMerge`) preserved
//! exactly as declared. No normalization happens here; resolving spans
//! into a rectangular grid is the grid builder's job.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{Block, Paragraph, RawCell, Table, TableRow};

/// Path of the main document part inside the docx container.
const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX document reader.
pub struct DocxReader {
    data: Vec<u8>,
    source_id: String,
}

impl DocxReader {
    /// Open a docx file. The file name becomes the source id used in
    /// diagnostics.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let data = fs::read(path)?;
        Ok(Self { data, source_id })
    }

    /// Read a docx from bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::from_bytes_with_id(data, "<bytes>")
    }

    /// Read a docx from bytes with an explicit source id.
    pub fn from_bytes_with_id(data: impl Into<Vec<u8>>, source_id: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            source_id: source_id.into(),
        }
    }

    /// Read a docx from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// The source id used in diagnostics.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Parse the document into an ordered list of blocks.
    ///
    /// Fails with [`Error::MalformedDocument`] when the container or
    /// its markup cannot be read. The failure is scoped to this
    /// document; batch processing logs it and continues.
    pub fn parse(&self) -> Result<Vec<Block>> {
        let xml = self.read_document_part()?;
        self.parse_markup(&xml)
    }

    /// Extract `word/document.xml` from the zip container.
    fn read_document_part(&self) -> Result<String> {
        let cursor = Cursor::new(&self.data);
        let mut archive = ZipArchive::new(cursor)
            .map_err(|e| Error::malformed(&self.source_id, format!("not a zip container: {e}")))?;
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|_| {
            Error::malformed(&self.source_id, format!("missing {DOCUMENT_PART} part"))
        })?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| Error::malformed(&self.source_id, format!("unreadable markup: {e}")))?;
        Ok(xml)
    }

    /// Walk the markup events and assemble blocks.
    fn parse_markup(&self, xml: &str) -> Result<Vec<Block>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut state = WalkState::default();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::malformed(&self.source_id, format!("broken XML markup: {e}"))
            })?;
            match event {
                Event::Start(ref e) => state.handle_start(e),
                Event::Empty(ref e) => state.handle_empty(e),
                Event::End(ref e) => state.handle_end(e.name().as_ref()),
                Event::Text(ref t) => {
                    if state.in_text {
                        let text = t.unescape().map_err(|e| {
                            Error::malformed(&self.source_id, format!("bad text escape: {e}"))
                        })?;
                        state.push_text(&text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!(
            "{}: parsed {} blocks ({} tables)",
            self.source_id,
            state.blocks.len(),
            state.blocks.iter().filter(|b| b.as_table().is_some()).count()
        );
        Ok(state.blocks)
    }
}

/// Accumulates one table cell while walking its markup.
#[derive(Debug, Default)]
struct CellBuilder {
    paragraphs: Vec<String>,
    current: String,
    col_span: usize,
    continuation: bool,
}

impl CellBuilder {
    fn new() -> Self {
        Self {
            col_span: 1,
            ..Self::default()
        }
    }

    fn finish_paragraph(&mut self) {
        let text = std::mem::take(&mut self.current);
        if !text.trim().is_empty() {
            self.paragraphs.push(text);
        }
    }

    fn build(mut self) -> RawCell {
        self.finish_paragraph();
        RawCell {
            // Continuation placeholders inherit text from the spanning
            // origin later; any stray text in them is discarded.
            text: if self.continuation {
                String::new()
            } else {
                self.paragraphs.join("\n").trim().to_string()
            },
            row_span: 1,
            col_span: self.col_span.max(1),
            continuation: self.continuation,
        }
    }
}

/// Streaming state while walking `word/document.xml`.
#[derive(Default)]
struct WalkState {
    blocks: Vec<Block>,
    paragraph: Option<Paragraph>,
    run: String,
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<CellBuilder>,
    /// Nesting depth of w:tbl; nested tables fold into the outer cell text
    table_depth: usize,
    in_text: bool,
}

impl WalkState {
    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => {
                if self.cell.is_none() {
                    self.paragraph = Some(Paragraph::default());
                }
                self.run.clear();
            }
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(Table::new());
                }
            }
            b"w:tr" => {
                if self.table_depth == 1 {
                    self.row = Some(TableRow::default());
                }
            }
            b"w:tc" => {
                if self.table_depth == 1 {
                    self.cell = Some(CellBuilder::new());
                }
            }
            b"w:t" => self.in_text = true,
            b"w:gridSpan" => self.handle_grid_span(e),
            b"w:vMerge" => self.handle_v_merge(e),
            b"w:pStyle" => {
                if let (Some(p), Some(style)) = (self.paragraph.as_mut(), get_attr(e, b"w:val")) {
                    p.style = Some(style);
                }
            }
            _ => {}
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:tab" => self.push_text("\t"),
            b"w:br" | b"w:cr" => self.push_text("\n"),
            b"w:gridSpan" => self.handle_grid_span(e),
            b"w:vMerge" => self.handle_v_merge(e),
            b"w:pStyle" => {
                if let (Some(p), Some(style)) = (self.paragraph.as_mut(), get_attr(e, b"w:val")) {
                    p.style = Some(style);
                }
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => {
                let run = std::mem::take(&mut self.run);
                if run.is_empty() {
                    return;
                }
                if let Some(cell) = self.cell.as_mut() {
                    cell.current.push_str(&run);
                } else if let Some(p) = self.paragraph.as_mut() {
                    p.add_run(run);
                }
            }
            b"w:p" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.finish_paragraph();
                } else if let Some(p) = self.paragraph.take() {
                    self.blocks.push(Block::Paragraph(p));
                }
            }
            b"w:tc" => {
                // Nested cell ends leave the outer builder active so
                // inner table text folds into the outer cell
                if self.table_depth == 1 {
                    if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                        row.cells.push(cell.build());
                    }
                }
            }
            b"w:tr" => {
                if self.table_depth == 1 {
                    if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                        table.add_row(row);
                    }
                }
            }
            b"w:tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                if self.table_depth == 0 {
                    if let Some(table) = self.table.take() {
                        self.blocks.push(Block::Table(table));
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_grid_span(&mut self, e: &BytesStart) {
        if let Some(cell) = self.cell.as_mut() {
            if let Some(span) = get_attr(e, b"w:val").and_then(|v| v.parse::<usize>().ok()) {
                cell.col_span = span.max(1);
            }
        }
    }

    /// `w:vMerge` with val="restart" starts a vertical span; a missing
    /// val or val="continue" marks a continuation placeholder.
    fn handle_v_merge(&mut self, e: &BytesStart) {
        if let Some(cell) = self.cell.as_mut() {
            let restart = get_attr(e, b"w:val").is_some_and(|v| v == "restart");
            cell.continuation = !restart;
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.current.push_str(text);
        } else {
            self.run.push_str(text);
        }
    }
}

/// Extract an attribute value by key from an element.
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
