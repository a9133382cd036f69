// Data structures for BEAT logs and decoded tables

use crate::core::constants::TIME_COLUMN;
use crate::core::error::{BeatError, Result};
use serde::{Deserialize, Serialize};

/// Classification of one line of a raw log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLogLine<'a> {
    MetadataMarker,
    DeviceIdentity(&'a str),
    AlarmEvent(&'a str),
    UiEvent(&'a str),
    WireEvent(&'a str),
    HeaderRow(Vec<&'a str>),
    DataRow(Vec<&'a str>),
    CommentRow(&'a str),
    Other,
}

/// Rows sharing one header. Every row has `header.len()` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Concatenated sections, still undecoded. Cells are raw strings.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn concat(sections: Vec<Section>) -> Self {
        let mut table = RawTable::default();
        for section in sections {
            if table.header.is_empty() {
                table.header = section.header;
            }
            table.rows.extend(section.rows);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered key/value pairs stored next to a preprocessed table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.replace(['\r', '\n'], " "));
            out.push('\n');
        }
        out
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut metadata = Metadata::default();
        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| BeatError::CorruptedCache(format!("metadata line {} has no '='", n + 1)))?;
            metadata.push(key.trim(), value.trim());
        }
        Ok(metadata)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Int(Vec<i64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Decoded table indexed by time. Only the assembler and the cache reader
/// build one; there is no path that decodes it again.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    pub index_name: String,
    pub time: Vec<f64>,
    pub columns: Vec<Column>,
}

impl DecodedTable {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            index_name: TIME_COLUMN.to_string(),
            time,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn push_int(&mut self, name: impl Into<String>, values: Vec<i64>) {
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Int(values),
        });
    }

    pub fn push_text(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Text(values),
        });
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| matches!(c.data, ColumnData::Int(_)))
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn int_column(&self, name: &str) -> Option<&[i64]> {
        self.columns.iter().find(|c| c.name == name).and_then(|c| match &c.data {
            ColumnData::Int(v) => Some(v.as_slice()),
            ColumnData::Text(_) => None,
        })
    }

    pub fn text_column(&self, name: &str) -> Option<&[String]> {
        self.columns.iter().find(|c| c.name == name).and_then(|c| match &c.data {
            ColumnData::Text(v) => Some(v.as_slice()),
            ColumnData::Int(_) => None,
        })
    }

    /// Value of a numeric column at the row whose time equals `time`.
    pub fn value_at(&self, name: &str, time: f64) -> Option<i64> {
        let row = self.time.iter().position(|t| (*t - time).abs() < 1e-9)?;
        self.int_column(name).map(|values| values[row])
    }

    /// Values of a numeric column with `start <= time <= end`.
    pub fn values_between(&self, name: &str, start: f64, end: f64) -> Option<Vec<i64>> {
        let values = self.int_column(name)?;
        Some(
            self.time
                .iter()
                .zip(values)
                .filter(|(t, _)| **t >= start && **t <= end)
                .map(|(_, v)| *v)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_text() {
        let mut meta = Metadata::default();
        meta.push("sw_version", "beat-1");
        meta.push("hw_info", "Board rev C");
        meta.push("hw_info", "MCU=STM32");

        let parsed = Metadata::from_text(&meta.to_text()).unwrap();
        assert_eq!(parsed.get("sw_version"), Some("beat-1"));
        assert_eq!(parsed.get_all("hw_info").collect::<Vec<_>>(), vec!["Board rev C", "MCU=STM32"]);
    }

    #[test]
    fn test_metadata_rejects_garbage() {
        assert!(Metadata::from_text("no separator here").is_err());
    }

    #[test]
    fn test_table_lookup() {
        let mut table = DecodedTable::new(vec![0.0, 0.02, 0.04]);
        table.push_int("State", vec![10, 30, 30]);
        table.push_text("Alarm", vec![String::new(), "0x204".into(), String::new()]);

        assert_eq!(table.value_at("State", 0.02), Some(30));
        assert_eq!(table.values_between("State", 0.01, 1.0), Some(vec![30, 30]));
        assert!(table.int_column("Alarm").is_none());
        assert_eq!(table.text_column("Alarm").unwrap()[1], "0x204");
        assert_eq!(table.numeric_names(), vec!["State"]);
    }
}
