// Processing options shared by the parser, decoder and segmentation

use crate::core::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Device sampling frequency, used for the pulse rate.
    pub sampling_rate_hz: f64,
    /// Rate of logged rows, used to turn row positions into seconds.
    pub index_rate_hz: f64,
    /// Prefix of catheter wire event lines.
    pub wire_tag: String,
    /// Intervals not longer than this are discarded as noise.
    pub min_interval_s: f64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            sampling_rate_hz: SAMPLING_RATE_HZ,
            index_rate_hz: INDEX_RATE_HZ,
            wire_tag: DEFAULT_WIRE_TAG.to_string(),
            min_interval_s: MIN_INTERVAL_S,
        }
    }
}
