//! Canonical output records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ternary outcome of interpreting a binary-choice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// A checked symbol was found
    Checked,
    /// An unchecked symbol was found
    Unchecked,
    /// No confident determination (distinct from an explicit Unchecked)
    #[default]
    Unknown,
}

/// A resolved value for a canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain text value
    Text(String),
    /// Ternary checkbox state
    Check(CheckState),
}

impl FieldValue {
    /// Get the text value, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Check(_) => None,
        }
    }

    /// Get the checkbox state, if this is one.
    pub fn as_check(&self) -> Option<CheckState> {
        match self {
            FieldValue::Check(s) => Some(*s),
            FieldValue::Text(_) => None,
        }
    }
}

/// One canonical record extracted from a source document.
///
/// At most one value per field; when two cells match the same field the
/// later-scanned one wins and the field name is recorded in
/// `ambiguous` so the overwrite is visible to callers and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier of the source document (file or zip entry name)
    pub source: String,

    /// Canonical field name -> resolved value
    pub fields: BTreeMap<String, FieldValue>,

    /// Fields that matched more than one cell (last-write-wins applied)
    pub ambiguous: Vec<String>,
}

impl Record {
    /// Create an empty record for a source document.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fields: BTreeMap::new(),
            ambiguous: Vec::new(),
        }
    }

    /// Set a field value. Returns the previous value when the field was
    /// already populated; the caller decides how to flag the overwrite.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    /// Get a field value by canonical name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Get a field's text, empty when absent or a checkbox.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(|v| v.as_text()).unwrap_or("")
    }

    /// Mark a field as ambiguously matched, once.
    pub fn flag_ambiguous(&mut self, name: &str) {
        if !self.ambiguous.iter().any(|f| f == name) {
            self.ambiguous.push(name.to_string());
        }
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field was populated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_set_and_get() {
        let mut record = Record::new("form1.docx");
        record.set("姓名", FieldValue::Text("张三".to_string()));

        assert_eq!(record.text("姓名"), "张三");
        assert_eq!(record.text("性别"), "");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_record_overwrite_returns_previous() {
        let mut record = Record::new("form1.docx");
        record.set("姓名", FieldValue::Text("张三".to_string()));
        let previous = record.set("姓名", FieldValue::Text("李四".to_string()));

        assert_eq!(previous, Some(FieldValue::Text("张三".to_string())));
        assert_eq!(record.text("姓名"), "李四");
    }

    #[test]
    fn test_ambiguous_flag_dedup() {
        let mut record = Record::new("form1.docx");
        record.flag_ambiguous("联系方式");
        record.flag_ambiguous("联系方式");
        assert_eq!(record.ambiguous, vec!["联系方式".to_string()]);
    }

    #[test]
    fn test_field_value_accessors() {
        let text = FieldValue::Text("ok".to_string());
        assert_eq!(text.as_text(), Some("ok"));
        assert_eq!(text.as_check(), None);

        let check = FieldValue::Check(CheckState::Checked);
        assert_eq!(check.as_check(), Some(CheckState::Checked));
        assert_eq!(check.as_text(), None);
    }
}
