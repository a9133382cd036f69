// Min / max / average of one channel over a time window

use crate::core::error::{BeatError, Result};
use crate::core::format::DecodedTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub x_min: f64,
    pub x_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub column: String,
    /// `None` when the full recording was used.
    pub range: Option<TimeRange>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn extract_data(table: &DecodedTable, column: &str, range: Option<TimeRange>) -> Result<ChannelStats> {
    let values = table
        .int_column(column)
        .ok_or_else(|| BeatError::Schema(format!("no numeric column '{}'", column)))?;

    let selected: Vec<f64> = table
        .time
        .iter()
        .zip(values)
        .filter(|(t, _)| range.map_or(true, |r| **t >= r.x_min && **t <= r.x_max))
        .map(|(_, v)| *v as f64)
        .collect();

    if selected.is_empty() {
        return Err(BeatError::EmptyRange);
    }

    let sum: f64 = selected.iter().sum();
    let min = selected.iter().copied().fold(f64::INFINITY, f64::min);
    let max = selected.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(ChannelStats {
        column: column.to_string(),
        range,
        average: round2(sum / selected.len() as f64),
        min,
        max,
    })
}
