// Turns concatenated raw sections into the decoded, time-indexed table

use crate::core::calibration::{extract_calibration, Calibration};
use crate::core::constants::*;
use crate::core::decoder::{
    battery_series, mean_arterial_pressure, pulse_bpm, raw_to_mmhg, BvDebug, Buttons, PumpWheel,
};
use crate::core::error::{BeatError, Result};
use crate::core::format::{DecodedTable, RawTable};
use crate::core::options::ProcessingOptions;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct Assembled {
    pub table: DecodedTable,
    pub calibration: Calibration,
    pub dropped_rows: usize,
}

/// Numeric columns after coercion, looked up by raw name.
struct NumericColumns {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl NumericColumns {
    fn get(&self, name: &str) -> Result<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| BeatError::missing_column(name))
    }

    /// `value * mul / div + offset`, in that order so exact multiples stay exact.
    fn scaled(&self, name: &str, mul: f64, div: f64, offset: f64) -> Result<Vec<f64>> {
        Ok(self.get(name)?.iter().map(|v| v * mul / div + offset).collect())
    }

    fn words(&self, name: &str) -> Result<Vec<i64>> {
        Ok(self.get(name)?.iter().map(|v| *v as i64).collect())
    }
}

/// Output columns in plotting order, still as floats.
#[derive(Default)]
struct Channels(Vec<(String, Vec<f64>)>);

impl Channels {
    fn push(&mut self, name: &str, values: Vec<f64>) {
        self.0.push((name.to_string(), values));
    }

    fn push_ints(&mut self, name: &str, values: impl Iterator<Item = i64>) {
        self.push(name, values.map(|v| v as f64).collect());
    }

    fn get(&self, name: &str) -> &[f64] {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }
}

fn column_position(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| BeatError::missing_column(name))
}

pub fn convert_data(mut raw: RawTable, options: &ProcessingOptions) -> Result<Assembled> {
    for name in raw.header.iter_mut() {
        *name = name.trim().to_string();
    }
    for name in REQUIRED_COLUMNS.iter().chain(EVENT_COLUMNS.iter()) {
        column_position(&raw.header, name)?;
    }

    let comment = column_position(&raw.header, COMMENT_COLUMN)?;
    let calibration = extract_calibration(raw.rows.iter().map(|row| row[comment].as_str()));

    let event_positions: Vec<usize> = EVENT_COLUMNS
        .iter()
        .map(|name| column_position(&raw.header, name))
        .collect::<Result<_>>()?;

    let numeric_positions: Vec<usize> = raw
        .header
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let name = name.as_str();
            name != INDEX_COLUMN && !UNUSED_COLUMNS.contains(&name) && !EVENT_COLUMNS.contains(&name)
        })
        .map(|(i, _)| i)
        .collect();

    // Coerce, keeping the row position for the time axis
    let total_rows = raw.len();
    let mut kept_positions = Vec::with_capacity(raw.len());
    let mut numeric_rows: Vec<Vec<f64>> = Vec::with_capacity(raw.len());
    let mut kept_rows = Vec::with_capacity(raw.len());
    for (position, row) in raw.rows.into_iter().enumerate() {
        let parsed: Option<Vec<f64>> = numeric_positions
            .iter()
            .map(|&i| row[i].trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect();
        match parsed {
            Some(values) => {
                kept_positions.push(position);
                numeric_rows.push(values);
                kept_rows.push(row);
            }
            None => debug!("Discarding corrupted data row {}", position),
        }
    }
    let dropped_rows = total_rows - numeric_rows.len();
    if dropped_rows > 0 {
        warn!("{} corrupted data rows discarded", dropped_rows);
    }
    if numeric_rows.is_empty() {
        return Err(BeatError::format(0, "no valid data rows left after coercion"));
    }

    let numeric = NumericColumns {
        names: numeric_positions.iter().map(|&i| raw.header[i].clone()).collect(),
        values: (0..numeric_positions.len())
            .map(|c| numeric_rows.iter().map(|row| row[c]).collect())
            .collect(),
    };

    let time: Vec<f64> = kept_positions
        .iter()
        .map(|&p| p as f64 / options.index_rate_hz)
        .collect();

    let channels = decode_channels(&numeric, &calibration, options)?;

    let mut table = DecodedTable::new(time);
    for (name, values) in channels.0 {
        table.push_int(name, values.into_iter().map(|v| v as i64).collect());
    }
    for (name, &pos) in EVENT_COLUMNS.iter().zip(&event_positions) {
        table.push_text(*name, kept_rows.iter().map(|row| row[pos].trim().to_string()).collect());
    }

    info!("Units are converted successfully, {} rows", table.len());
    Ok(Assembled {
        table,
        calibration,
        dropped_rows,
    })
}

fn push_pressure(channels: &mut Channels, numeric: &NumericColumns, channel: &str, sources: [&str; 3], sensitivity: Option<f64>) -> Result<()> {
    let mut decoded = Vec::with_capacity(3);
    for (source, kind) in sources.iter().zip(["raw", "fast", "slow"]) {
        match raw_to_mmhg(channel, numeric.get(source)?, sensitivity) {
            Ok(values) => decoded.push((format!("{}, {}", channel, kind), values)),
            Err(e @ BeatError::MissingCalibration { .. }) => {
                error!("{}, {} pressure channels skipped", e, channel);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
    for (name, values) in decoded {
        channels.push(&name, values);
    }
    Ok(())
}

fn decode_channels(numeric: &NumericColumns, calibration: &Calibration, options: &ProcessingOptions) -> Result<Channels> {
    let mut ch = Channels::default();

    push_pressure(&mut ch, numeric, "Tip", ["Raw0", "Fast0", "Slow0"], calibration.tip)?;
    push_pressure(&mut ch, numeric, "Balloon", ["Raw1", "Fast1", "Slow1"], calibration.balloon)?;

    ch.push("Systolic", numeric.scaled("Systolic", 1.0, 10.0, 0.0)?);
    ch.push("Diastolic", numeric.scaled("Diastolic", 1.0, 10.0, 0.0)?);
    let map = ch
        .get("Systolic")
        .iter()
        .zip(ch.get("Diastolic"))
        .map(|(s, d)| mean_arterial_pressure(*s, *d))
        .collect();
    ch.push("MAP", map);

    ch.push("BPDiff", numeric.scaled("BPDiff", 1.0, 10.0, 0.0)?);
    ch.push("SlowBPDiff", numeric.scaled("SlowBPDiff", 1.0, 10.0, 0.0)?);
    ch.push("BPUpdate", numeric.get("BPUpdate")?.to_vec());
    let pulse = ch
        .get("BPDiff")
        .iter()
        .zip(numeric.get("BPUpdate")?)
        .map(|(diff, update)| pulse_bpm(*diff, *update, options.sampling_rate_hz))
        .collect();
    ch.push("Pulse BPM", pulse);
    ch.push("BPStable", numeric.get("BPStable")?.to_vec());

    for name in ["BalloonHigh", "BalloonLow", "BalloonDiff", "AirTemp"] {
        ch.push(name, numeric.scaled(name, 1.0, 10.0, 0.0)?);
    }
    ch.push("AirPres", numeric.scaled("AirPres", 1.0, 10.0, -750.0)?);
    ch.push("SubjTemp", numeric.scaled("SubjTemp", 1.0, 10.0, 0.0)?);

    for name in ["BattRaw", "BattFast", "BattSlow"] {
        ch.push(name, numeric.scaled(name, 100.0, 4095.0, 0.0)?);
    }
    ch.push("BattPercent", battery_series(numeric.get("BattSlow")?));
    for name in ["VrefintRaw", "VrefintFast", "VrefintSlow"] {
        ch.push(name, numeric.scaled(name, 30.0, 4095.0, 0.0)?);
    }

    ch.push("MotorPos", numeric.scaled("MotorPos", 1.0, 1000.0, 0.0)?);
    ch.push(STATE_COLUMN, numeric.scaled(STATE_COLUMN, 10.0, 1.0, 0.0)?);

    let buttons: Vec<Buttons> = numeric.words("Buttons")?.into_iter().map(Buttons::decode).collect();
    ch.push_ints("Inflate", buttons.iter().map(|b| b.inflate));
    ch.push_ints("Deflate", buttons.iter().map(|b| b.deflate));
    ch.push_ints("Alarm Ack", buttons.iter().map(|b| b.alarm_ack));

    ch.push("TgtSpeed", numeric.scaled("TgtSpeed", 1.0, 100.0, 0.0)?);
    ch.push("CurSpeed", numeric.scaled("CurSpeed", 1.0, 100.0, 0.0)?);

    let bv: Vec<BvDebug> = numeric.words("BVDebug")?.into_iter().map(BvDebug::decode).collect();
    ch.push_ints("BVPoints", bv.iter().map(|d| d.points));
    ch.push_ints("BVState", bv.iter().map(|d| d.state));
    ch.push_ints("BVFlags", bv.iter().map(|d| d.flags));

    let pw: Vec<PumpWheel> = numeric.words("PumpWheel")?.into_iter().map(PumpWheel::decode).collect();
    ch.push("PW pos", pw.iter().map(|w| w.position).collect());
    ch.push_ints("PW State", pw.iter().map(|w| w.state));
    ch.push_ints("PW Illegal", pw.iter().map(|w| w.illegal));
    ch.push_ints("PW HallA", pw.iter().map(|w| w.hall_a));
    ch.push_ints("PW HallB", pw.iter().map(|w| w.hall_b));
    ch.push_ints("GPIO HallA", pw.iter().map(|w| w.gpio_hall_a));
    ch.push_ints("GPIO HallB", pw.iter().map(|w| w.gpio_hall_b));

    Ok(ch)
}
