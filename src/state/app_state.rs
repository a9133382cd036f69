use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use beat_reader::core::constants::EVENT_COLUMNS;
use beat_reader::core::segmentation::PhaseSummary;
use beat_reader::{
    measure_text_duration, open_datafile, phase_summary, read_metadata, read_preproc_data,
    DecodedTable, EventSpan, Metadata, ProcessingOptions, Result,
};

/// A decoded log with its derived events, computed once on load.
pub struct LoadedFile {
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub table: Arc<DecodedTable>,
    pub metadata: Metadata,
    pub phases: PhaseSummary,
    pub events: Vec<(String, Vec<EventSpan>)>,
}

impl LoadedFile {
    /// Blocking: parses or reuses the cache, then segments.
    pub fn load(path: &Path, options: &ProcessingOptions) -> Result<Self> {
        let artifact = open_datafile(Some(path), options)?;
        let table = read_preproc_data(&artifact)?;
        let metadata = read_metadata(&artifact).unwrap_or_default();
        let phases = phase_summary(&table, options.min_interval_s)?;
        let events: Vec<(String, Vec<EventSpan>)> = EVENT_COLUMNS
            .iter()
            .map(|column| measure_text_duration(&table, column).map(|spans| (column.to_string(), spans)))
            .collect::<Result<_>>()?;

        Ok(Self {
            source: path.to_path_buf(),
            artifact,
            table: Arc::new(table),
            metadata,
            phases,
            events,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub file: Arc<RwLock<Option<Arc<LoadedFile>>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            file: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn current(&self) -> Option<Arc<LoadedFile>> {
        self.file.read().await.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
