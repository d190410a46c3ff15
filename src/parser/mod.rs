//! Document parsing module.

mod docx;

pub use docx::DocxReader;
