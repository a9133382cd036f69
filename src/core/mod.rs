pub mod assembler;
pub mod cache;
pub mod calibration;
pub mod compression;
pub mod constants;
pub mod data_handle;
pub mod decoder;
pub mod error;
pub mod format;
pub mod options;
pub mod sections;
pub mod segmentation;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;
