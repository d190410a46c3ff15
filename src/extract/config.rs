//! Extraction configuration: canonical fields, keywords, checkbox
//! symbols and output column order.
//!
//! The configuration is loaded once, before any document is processed,
//! and never mutated during a run. The compiled-in default matches the
//! student-registration forms this tool was built for; a JSON file with
//! the same shape can replace it without a code change.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text value
    #[default]
    Text,
    /// Binary choice interpreted as a ternary checkbox state
    Checkbox,
}

/// A canonical output field and the keywords that recognize its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical output field name
    pub name: String,

    /// Synonym keywords matched against normalized cell text
    pub keywords: Vec<String>,

    /// Field kind
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create a text field.
    pub fn text(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            kind: FieldKind::Text,
        }
    }

    /// Create a checkbox field.
    pub fn checkbox(name: &str, keywords: &[&str]) -> Self {
        Self {
            kind: FieldKind::Checkbox,
            ..Self::text(name, keywords)
        }
    }
}

/// Disjoint symbol sets for checkbox interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckboxSymbols {
    /// Symbols meaning "checked"
    pub checked: Vec<String>,

    /// Symbols meaning "unchecked"
    pub unchecked: Vec<String>,
}

impl Default for CheckboxSymbols {
    fn default() -> Self {
        Self {
            checked: ["☑", "☒", "✓", "✔", "√", "■", "●", "▣", "▲", "◆", "是", "同意", "接受"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unchecked: ["☐", "□", "▢", "◻", "否", "不同意", "不接受"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Strings used when serializing checkbox states to spreadsheet cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Output for a checked state
    pub checked: String,
    /// Output for an unchecked state
    pub unchecked: String,
    /// Output for an unknown state
    pub unknown: String,
}

impl Default for CheckOutput {
    fn default() -> Self {
        Self {
            checked: "是".to_string(),
            unchecked: "否".to_string(),
            unknown: String::new(),
        }
    }
}

/// Complete, read-only extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Canonical fields in output column order
    pub fields: Vec<FieldSpec>,

    /// Checkbox symbol sets
    pub checkbox: CheckboxSymbols,

    /// Checkbox state serialization
    pub check_output: CheckOutput,

    /// Column name for the source document id
    pub source_column: String,

    /// Label fragments shorter than this many characters are candidates
    /// for split-label repair
    pub min_label_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldSpec::text("姓名", &["姓名"]),
                FieldSpec::text("性别", &["性别"]),
                FieldSpec::text("出生年月", &["出生年月", "出生"]),
                FieldSpec::text("政治面貌", &["政治面貌"]),
                FieldSpec::text("所在分院", &["所在分院", "分院"]),
                FieldSpec::text("班级", &["班级"]),
                FieldSpec::text("学号", &["学号"]),
                FieldSpec::text(
                    "现（曾）任职务",
                    &["现任职务", "曾任职", "任职", "现任", "曾任"],
                ),
                FieldSpec::text("第一志愿", &["第一志愿"]),
                FieldSpec::text("第二志愿", &["第二志愿"]),
                FieldSpec::checkbox("服从分配", &["服从分配", "服从调剂"]),
                FieldSpec::text(
                    "联系方式",
                    &["联系方式", "联系电话", "手机号", "手机", "电话"],
                ),
                FieldSpec::text("微信", &["微信"]),
                FieldSpec::text("何时何地曾担任何职务", &["何时何地曾担任何职务", "何时何地"]),
                FieldSpec::text("曾获奖项及获奖时间", &["曾获奖项", "曾获", "奖项", "获奖"]),
                FieldSpec::text(
                    "个人优势分析及简要工作设想",
                    &["个人优势", "工作设想", "优势分析"],
                ),
            ],
            checkbox: CheckboxSymbols::default(),
            check_output: CheckOutput::default(),
            source_column: "文件名".to_string(),
            min_label_chars: 2,
        }
    }
}

impl ExtractConfig {
    /// Load a configuration from a JSON string. Missing sections fall
    /// back to the compiled-in defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject configurations the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::Config("no fields configured".to_string()));
        }
        for field in &self.fields {
            if field.keywords.is_empty() {
                return Err(Error::Config(format!(
                    "field {} has no keywords",
                    field.name
                )));
            }
        }
        for symbol in &self.checkbox.checked {
            if self.checkbox.unchecked.contains(symbol) {
                return Err(Error::Config(format!(
                    "symbol {symbol} appears in both checkbox sets"
                )));
            }
        }
        Ok(())
    }

    /// Output column order: the source id column followed by the fields
    /// in configuration order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.fields.len() + 1);
        columns.push(self.source_column.clone());
        columns.extend(self.fields.iter().map(|f| f.name.clone()));
        columns
    }

    /// Look up a field spec by canonical name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All keywords across all fields, space-stripped, for label tests.
    pub fn all_keywords(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|f| f.keywords.iter())
            .map(|k| k.replace(' ', ""))
            .collect()
    }
}
