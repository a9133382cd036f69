// BEAT device log reader
// Main library entry point

pub mod core;

// Re-export main types
pub use crate::core::cache::{open_datafile, preprocess, read_metadata, read_preproc_data};
pub use crate::core::data_handle::handle_ws_fetch;
pub use crate::core::error::{BeatError, Result};
pub use crate::core::format::{DecodedTable, Metadata};
pub use crate::core::options::ProcessingOptions;
pub use crate::core::segmentation::{
    measure_duration, measure_text_duration, measure_time, phase_summary, EventSpan, Interval,
};
pub use crate::core::stats::{extract_data, ChannelStats, TimeRange};

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(DATA_PREFIX, "Data:");
        assert_eq!(INDEX_RATE_HZ * 4.0, SAMPLING_RATE_HZ);
        assert!(SW_VERSION.starts_with("beat-"));
    }
}
