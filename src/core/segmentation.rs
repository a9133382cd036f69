//! Event segmentation over the decoded `State` column and the text event
//! columns.
//!
//! State values are the decoded ones (firmware state × 10). Numeric scans
//! drop intervals whose duration does not exceed the configured minimum;
//! text scans keep every span, since a single logged alarm is a point event.

use crate::core::constants::{STATE_COLUMN, TIME_COLUMN};
use crate::core::error::{BeatError, Result};
use crate::core::format::DecodedTable;
use serde::Serialize;

pub const STATE_READY: i64 = 30;
pub const STATE_INFLATING: i64 = 50;
pub const STATE_INFLATED: i64 = 80;
pub const STATE_DEFLATING: i64 = 100;
pub const STATE_PAUSE: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSpan {
    pub event: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

/// Inflation phases as shown in the statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub time_to_inflation: Option<Interval>,
    pub inflation: Vec<Interval>,
    pub deflation: Vec<Interval>,
    pub pause: Vec<Interval>,
}

fn state_signal(table: &DecodedTable) -> Result<&[i64]> {
    if table.index_name != TIME_COLUMN {
        return Err(BeatError::Schema(format!(
            "table must be indexed by '{}', found '{}'",
            TIME_COLUMN, table.index_name
        )));
    }
    table
        .int_column(STATE_COLUMN)
        .ok_or_else(|| BeatError::missing_column(STATE_COLUMN))
}

fn keep(start_time: f64, end_time: f64, min_duration: f64) -> Option<Interval> {
    let duration = end_time - start_time;
    (duration > min_duration).then_some(Interval {
        start_time,
        end_time,
        duration,
    })
}

/// Intervals opened by `state_start` and closed by the next `state_end`.
pub fn measure_time(table: &DecodedTable, state_start: i64, state_end: i64, min_duration: f64) -> Result<Vec<Interval>> {
    let states = state_signal(table)?;
    let mut intervals = Vec::new();
    let mut open: Option<f64> = None;

    for (&time, &state) in table.time.iter().zip(states) {
        if state == state_start && open.is_none() {
            open = Some(time);
        }
        if state == state_end {
            if let Some(start) = open.take() {
                intervals.extend(keep(start, time, min_duration));
            }
        }
    }
    Ok(intervals)
}

/// Intervals spent continuously in `state`.
pub fn measure_duration(table: &DecodedTable, state: i64, min_duration: f64) -> Result<Vec<Interval>> {
    let states = state_signal(table)?;
    let mut intervals = Vec::new();
    let mut open: Option<f64> = None;

    for (&time, &value) in table.time.iter().zip(states) {
        match (value == state, open) {
            (true, None) => open = Some(time),
            (false, Some(start)) => {
                intervals.extend(keep(start, time, min_duration));
                open = None;
            }
            _ => {}
        }
    }
    Ok(intervals)
}

/// Spans of identical non-empty strings in a text event column. A span ends
/// on the first row whose value differs.
pub fn measure_text_duration(table: &DecodedTable, column: &str) -> Result<Vec<EventSpan>> {
    let values = table
        .text_column(column)
        .ok_or_else(|| BeatError::missing_column(column))?;

    let mut spans = Vec::new();
    let mut open: Option<(&str, f64)> = None;
    for (&time, value) in table.time.iter().zip(values) {
        if let Some((event, start)) = open {
            if event == value {
                continue;
            }
            spans.push(EventSpan {
                event: event.to_string(),
                start_time: start,
                end_time: time,
                duration: time - start,
            });
            open = None;
        }
        if !value.is_empty() {
            open = Some((value.as_str(), time));
        }
    }

    if let (Some((event, start)), Some(&end)) = (open, table.time.last()) {
        spans.push(EventSpan {
            event: event.to_string(),
            start_time: start,
            end_time: end,
            duration: end - start,
        });
    }
    Ok(spans)
}

pub fn phase_summary(table: &DecodedTable, min_duration: f64) -> Result<PhaseSummary> {
    Ok(PhaseSummary {
        time_to_inflation: measure_time(table, STATE_READY, STATE_INFLATING, min_duration)?
            .into_iter()
            .next(),
        inflation: measure_time(table, STATE_INFLATING, STATE_INFLATED, min_duration)?,
        deflation: measure_time(table, STATE_DEFLATING, STATE_READY, min_duration)?,
        pause: measure_duration(table, STATE_PAUSE, min_duration)?,
    })
}
