//! Batch processing of a document working set.
//!
//! Documents are independent: each one runs the whole pipeline on its
//! own and yields one record, so the batch is embarrassingly parallel.
//! The only shared state is the read-only configuration. A malformed
//! document is logged and skipped; it never aborts the batch.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use rayon::prelude::*;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::extract::ExtractConfig;
use crate::model::Record;
use crate::parser::DocxReader;

/// One document of the working set, read into memory.
///
/// Bundled documents never touch the filesystem: zip entries are
/// extracted straight into the source's byte buffer.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Stable identifier: the file name, or `bundle.zip/entry.docx`
    pub id: String,

    /// Raw docx bytes
    pub data: Vec<u8>,
}

impl DocumentSource {
    /// Create a source from an id and raw bytes.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Outcome of processing one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Source id the outcome belongs to
    pub source_id: String,

    /// The extracted record, or the per-document error
    pub result: Result<Record>,
}

impl DocumentOutcome {
    /// Check whether the document was processed successfully.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Collect the document working set from a directory.
///
/// `.docx` files are read directly; `.docx` entries inside `.zip`
/// bundles are extracted in memory, one level deep only; nested
/// bundles are not descended into. Returns [`Error::NoDocuments`]
/// when nothing usable is found, the batch's only fatal condition.
pub fn collect_sources<P: AsRef<Path>>(dir: P) -> Result<Vec<DocumentSource>> {
    let dir = dir.as_ref();
    let mut sources = Vec::new();

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let lower = name.to_lowercase();

        if lower.ends_with(".docx") {
            sources.push(DocumentSource::new(name, fs::read(&path)?));
        } else if lower.ends_with(".zip") {
            match collect_bundle(&path, &name) {
                Ok(mut bundled) => sources.append(&mut bundled),
                Err(e) => log::error!("skipping unreadable bundle {name}: {e}"),
            }
        }
    }

    if sources.is_empty() {
        return Err(Error::NoDocuments(dir.display().to_string()));
    }
    log::info!("collected {} documents from {}", sources.len(), dir.display());
    Ok(sources)
}

/// Pull `.docx` entries out of one zip bundle.
fn collect_bundle(path: &Path, bundle_name: &str) -> Result<Vec<DocumentSource>> {
    let data = fs::read(path)?;
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut sources = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().to_lowercase().ends_with(".docx") {
            continue;
        }
        let entry_name = entry
            .name()
            .rsplit('/')
            .next()
            .unwrap_or(entry.name())
            .to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        sources.push(DocumentSource::new(
            format!("{bundle_name}/{entry_name}"),
            bytes,
        ));
    }
    Ok(sources)
}

/// Process one document end to end: parse, then extract a record from
/// its tables. Pure apart from logging.
///
/// The record comes from the first table that yields at least one
/// populated field; a document whose tables all match nothing still
/// gets an empty record so it occupies one output row.
pub fn process_document(source: &DocumentSource, config: &ExtractConfig) -> Result<Record> {
    let reader = DocxReader::from_bytes_with_id(source.data.clone(), source.id.as_str());
    let blocks = reader.parse()?;
    crate::extract_blocks(&blocks, config, &source.id)
}

/// Process a working set into per-document outcomes.
///
/// Outcomes carry errors instead of aborting: a malformed document is
/// logged at error level and the batch continues. Completion order is
/// unspecified under rayon, so outcomes are sorted by source id after
/// collection.
pub fn process(
    sources: &[DocumentSource],
    config: &ExtractConfig,
    parallel: bool,
) -> Vec<DocumentOutcome> {
    process_with_progress(sources, config, parallel, |_| {})
}

/// Same as [`process`], invoking `on_document` once per completed
/// document. Under rayon the callback runs on worker threads, in
/// completion order.
pub fn process_with_progress<F>(
    sources: &[DocumentSource],
    config: &ExtractConfig,
    parallel: bool,
    on_document: F,
) -> Vec<DocumentOutcome>
where
    F: Fn(&DocumentOutcome) + Sync,
{
    let run = |source: &DocumentSource| {
        let result = process_document(source, config);
        if let Err(ref e) = result {
            log::error!("failed to process {}: {e}", source.id);
        }
        let outcome = DocumentOutcome {
            source_id: source.id.clone(),
            result,
        };
        on_document(&outcome);
        outcome
    };

    let mut outcomes: Vec<DocumentOutcome> = if parallel {
        sources.par_iter().map(run).collect()
    } else {
        sources.iter().map(run).collect()
    };

    outcomes.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    outcomes
}

/// Convenience: keep only the successful records, in source-id order.
pub fn collect_records(outcomes: Vec<DocumentOutcome>) -> Vec<Record> {
    outcomes
        .into_iter()
        .filter_map(|o| o.result.ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with_table(rows: &[&[&str]]) -> Vec<u8> {
        let mut body = String::from("<w:tbl>");
        for row in rows {
            body.push_str("<w:tr>");
            for cell in *row {
                body.push_str(&format!(
                    "<w:tc><w:p><w:r><w:t>{cell}</w:t></w:r></w:p></w:tc>"
                ));
            }
            body.push_str("</w:tr>");
        }
        body.push_str("</w:tbl>");

        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_process_document() {
        let source = DocumentSource::new(
            "form.docx",
            docx_with_table(&[&["姓名", "张三"], &["性别", "男"]]),
        );
        let record = process_document(&source, &ExtractConfig::default()).unwrap();
        assert_eq!(record.source, "form.docx");
        assert_eq!(record.text("姓名"), "张三");
    }

    #[test]
    fn test_malformed_document_is_isolated() {
        let sources = vec![
            DocumentSource::new("bad.docx", b"not a zip".to_vec()),
            DocumentSource::new(
                "good.docx",
                docx_with_table(&[&["姓名", "张三"]]),
            ),
        ];
        let outcomes = process(&sources, &ExtractConfig::default(), false);

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());

        let records = collect_records(outcomes);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("姓名"), "张三");
    }

    #[test]
    fn test_outcomes_sorted_by_source_id() {
        let sources = vec![
            DocumentSource::new("b.docx", docx_with_table(&[&["姓名", "乙"]])),
            DocumentSource::new("a.docx", docx_with_table(&[&["姓名", "甲"]])),
        ];
        let outcomes = process(&sources, &ExtractConfig::default(), true);
        assert_eq!(outcomes[0].source_id, "a.docx");
        assert_eq!(outcomes[1].source_id, "b.docx");
    }

    #[test]
    fn test_progress_callback_fires_per_document() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let sources = vec![
            DocumentSource::new("a.docx", docx_with_table(&[&["姓名", "甲"]])),
            DocumentSource::new("bad.docx", b"not a zip".to_vec()),
        ];
        let seen = AtomicUsize::new(0);
        let outcomes =
            process_with_progress(&sources, &ExtractConfig::default(), true, |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });

        // Failed documents tick the callback too
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn test_document_without_matches_gets_empty_record() {
        let source = DocumentSource::new(
            "plain.docx",
            docx_with_table(&[&["甲", "乙"]]),
        );
        let record = process_document(&source, &ExtractConfig::default()).unwrap();
        assert!(record.is_empty());
        assert_eq!(record.source, "plain.docx");
    }

    #[test]
    fn test_collect_sources_with_bundle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("direct.docx"), docx_with_table(&[&["姓名", "甲"]])).unwrap();

        let mut bundle = ZipWriter::new(Cursor::new(Vec::new()));
        bundle
            .start_file("inner.docx", SimpleFileOptions::default())
            .unwrap();
        bundle
            .write_all(&docx_with_table(&[&["姓名", "乙"]]))
            .unwrap();
        let bundle_bytes = bundle.finish().unwrap().into_inner();
        fs::write(dir.path().join("pack.zip"), bundle_bytes).unwrap();

        let sources = collect_sources(dir.path()).unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["direct.docx", "pack.zip/inner.docx"]);
    }

    #[test]
    fn test_empty_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_sources(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoDocuments(_)));
    }
}
