// Error handling for the BEAT log pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeatError>;

#[derive(Error, Debug)]
pub enum BeatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Data line {line} appears before any header line")]
    NoHeader { line: usize },

    #[error("Missing calibration constant for {channel} pressure")]
    MissingCalibration { channel: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unconvertible value in column {column} at row {row}")]
    Unconvertible { column: String, row: usize },

    #[error("Corrupted cache: {0}")]
    CorruptedCache(String),

    #[error("No data file given and none configured")]
    NoDataFile,

    #[error("No samples in the selected range")]
    EmptyRange,
}

impl BeatError {
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        BeatError::Format {
            line,
            reason: reason.into(),
        }
    }

    pub fn missing_column(name: &str) -> Self {
        BeatError::Schema(format!("required column '{}' is missing", name))
    }
}
