//! Document model types for form extraction.
//!
//! This module defines the intermediate representation (IR) that the
//! pipeline passes forward: raw blocks as parsed from document markup,
//! the dense grid rebuilt from a raw table, and the canonical record
//! produced per source document. All of it is per-document state,
//! created fresh and discarded once the record has been collected.

mod block;
mod grid;
mod record;

pub use block::{Block, Paragraph, RawCell, Table, TableRow};
pub use grid::{Grid, LogicalCell};
pub use record::{CheckState, FieldValue, Record};
