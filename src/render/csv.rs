//! CSV rendering for extracted records.

use std::path::Path;

use crate::error::Result;
use crate::extract::ExtractConfig;
use crate::model::{CheckState, FieldValue, Record};

/// Render records as CSV with one column per canonical field, in the
/// configured column order. The first column carries the source id.
pub fn to_csv(records: &[Record], config: &ExtractConfig) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_rows(&mut writer, records, config)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::Error::Render(format!("CSV buffer error: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| crate::error::Error::Render(format!("CSV encoding error: {e}")))
}

/// Write records as a CSV file.
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    records: &[Record],
    config: &ExtractConfig,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    write_rows(&mut writer, records, config)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    records: &[Record],
    config: &ExtractConfig,
) -> Result<()> {
    writer.write_record(config.columns())?;

    for record in records {
        let mut row = Vec::with_capacity(config.fields.len() + 1);
        row.push(record.source.clone());
        for field in &config.fields {
            row.push(cell_value(record.get(&field.name), config));
        }
        writer.write_record(&row)?;
    }
    Ok(())
}

/// Serialize one field value to its spreadsheet cell.
fn cell_value(value: Option<&FieldValue>, config: &ExtractConfig) -> String {
    match value {
        None => String::new(),
        Some(FieldValue::Text(s)) => s.clone(),
        Some(FieldValue::Check(state)) => match state {
            CheckState::Checked => config.check_output.checked.clone(),
            CheckState::Unchecked => config.check_output.unchecked.clone(),
            CheckState::Unknown => config.check_output.unknown.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let mut record = Record::new("form1.docx");
        record.set("姓名", FieldValue::Text("张三".to_string()));
        record.set("服从分配", FieldValue::Check(CheckState::Checked));
        record
    }

    #[test]
    fn test_csv_header_order() {
        let config = ExtractConfig::default();
        let csv = to_csv(&[], &config).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("文件名,姓名,性别"));
    }

    #[test]
    fn test_csv_row_values() {
        let config = ExtractConfig::default();
        let csv = to_csv(&[sample_record()], &config).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.starts_with("form1.docx,张三,"));
        // Checked state rendered with the configured output string
        assert!(row.contains(",是,"));
    }

    #[test]
    fn test_missing_fields_are_empty_cells() {
        let config = ExtractConfig::default();
        let csv = to_csv(&[Record::new("empty.docx")], &config).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();

        assert_eq!(cells[0], "empty.docx");
        assert!(cells[1..].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let config = ExtractConfig::default();

        write_csv(&path, &[sample_record()], &config).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("张三"));
    }
}
