// Raw integer to physical unit conversions

use crate::core::constants::{BATTERY_START_PERCENT, PULSE_DIFF_THRESHOLD};
use crate::core::error::{BeatError, Result};

/// Converts ADC counts to mmHg with a per-channel sensitivity.
pub fn raw_to_mmhg(column: &str, raw: &[f64], sensitivity: Option<f64>) -> Result<Vec<f64>> {
    let sensitivity = sensitivity.ok_or_else(|| BeatError::MissingCalibration {
        channel: column.to_string(),
    })?;

    raw.iter()
        .enumerate()
        .map(|(row, value)| {
            if value.is_finite() {
                Ok(sensitivity * value)
            } else {
                Err(BeatError::Unconvertible {
                    column: column.to_string(),
                    row,
                })
            }
        })
        .collect()
}

/// Two's-complement decode of the low 16 bits.
pub fn s16(value: i64) -> i64 {
    (value & 0xFFFF) as u16 as i16 as i64
}

/// Piecewise-linear battery percentage. The result never rises more than one
/// percent above `previous`.
pub fn battery_percent(raw: f64, previous: f64) -> f64 {
    let percent = if raw > 3550.0 {
        100.0
    } else if raw > 2900.0 {
        (raw - 2900.0) * 70.0 / (3550.0 - 2900.0) + 10.0
    } else if raw > 2460.0 {
        (raw - 2460.0) * 10.0 / (2900.0 - 2460.0)
    } else {
        0.0
    };
    percent.min(previous + 1.0)
}

/// Battery percentage for one file. The clamp state starts full on every call.
pub fn battery_series(raw: &[f64]) -> Vec<f64> {
    raw.iter()
        .scan(BATTERY_START_PERCENT, |previous, &value| {
            *previous = battery_percent(value, *previous);
            Some(*previous)
        })
        .collect()
}

pub fn mean_arterial_pressure(systolic: f64, diastolic: f64) -> f64 {
    (systolic + 2.0 * diastolic) / 3.0
}

/// Beats per minute from the update interval (in samples). `bp_diff` is the
/// pulse amplitude in mmHg; weak pulses read as zero.
pub fn pulse_bpm(bp_diff: f64, bp_update: f64, sampling_rate: f64) -> f64 {
    if bp_diff >= PULSE_DIFF_THRESHOLD && bp_update > 0.0 {
        60.0 * sampling_rate / bp_update
    } else {
        0.0
    }
}

/// Extracts `(word >> shift) & mask`, scaled for plotting separation.
pub fn bit_field(word: i64, shift: u32, mask: i64, scale: i64, offset: i64) -> i64 {
    ((word >> shift) & mask) * scale + offset
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buttons {
    pub inflate: i64,
    pub deflate: i64,
    pub alarm_ack: i64,
}

impl Buttons {
    pub fn decode(word: i64) -> Self {
        Self {
            inflate: bit_field(word, 0, 0x03, 10, 0),
            deflate: bit_field(word, 2, 0x03, 10, 0),
            alarm_ack: bit_field(word, 4, 0x03, 10, 0),
        }
    }
}

/// Balloon volume debug word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvDebug {
    pub points: i64,
    pub state: i64,
    pub flags: i64,
}

impl BvDebug {
    pub fn decode(word: i64) -> Self {
        Self {
            points: (word >> 24) * 10,
            state: bit_field(word, 16, 0x0F, 10, 0),
            flags: bit_field(word, 0, 0x0F, 10, -150),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpWheel {
    pub position: f64,
    pub state: i64,
    pub illegal: i64,
    pub hall_a: i64,
    pub hall_b: i64,
    pub gpio_hall_a: i64,
    pub gpio_hall_b: i64,
}

impl PumpWheel {
    pub fn decode(word: i64) -> Self {
        Self {
            position: s16(word >> 16) as f64 / 1000.0,
            state: bit_field(word, 4, 0x0F, 10, 0),
            illegal: bit_field(word, 8, 0xFF, 10, 0),
            hall_a: bit_field(word, 2, 0x01, 10, -32),
            hall_b: bit_field(word, 3, 0x01, 10, -33),
            gpio_hall_a: bit_field(word, 0, 0x01, 10, -20),
            gpio_hall_b: bit_field(word, 1, 0x01, 10, -21),
        }
    }
}
