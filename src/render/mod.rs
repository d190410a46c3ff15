//! Rendering module for serializing records to output formats.

mod csv;
mod json;

pub use csv::{to_csv, write_csv};
pub use json::{to_json, JsonFormat};
