// Preprocessed-file cache: compressed decoded table plus a metadata sidecar

use crate::core::assembler::convert_data;
use crate::core::compression::{open_reader, FileWriter};
use crate::core::constants::*;
use crate::core::error::{BeatError, Result};
use crate::core::format::{ColumnData, DecodedTable, Metadata, RawTable};
use crate::core::options::ProcessingOptions;
use crate::core::sections::read_raw_data;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Missing,
    NoMetadata,
    VersionMismatch(String),
    Fresh,
}

/// Artifact and sidecar paths for a raw log: `<base>_PREPROC.gz`, `<base>_PREPROC.meta`.
pub fn preproc_paths(raw_path: &Path) -> (PathBuf, PathBuf) {
    let stem = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sibling = |ext: &str| raw_path.with_file_name(format!("{}{}.{}", stem, PREPROC_SUFFIX, ext));
    (sibling(PREPROC_EXTENSION), sibling(META_EXTENSION))
}

pub fn is_preproc_artifact(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map_or(false, |s| s.ends_with(PREPROC_SUFFIX))
        && path.extension().and_then(|e| e.to_str()) == Some(PREPROC_EXTENSION)
}

pub fn cache_status(artifact: &Path, meta_path: &Path) -> CacheStatus {
    if !artifact.exists() {
        return CacheStatus::Missing;
    }
    let metadata = match fs::read_to_string(meta_path).map_err(BeatError::from).and_then(|t| Metadata::from_text(&t)) {
        Ok(m) => m,
        Err(e) => {
            debug!("Sidecar {} unusable: {}", meta_path.display(), e);
            return CacheStatus::NoMetadata;
        }
    };
    match metadata.get(SW_VERSION_KEY) {
        Some(version) if version == SW_VERSION => CacheStatus::Fresh,
        Some(version) => CacheStatus::VersionMismatch(version.to_string()),
        None => CacheStatus::NoMetadata,
    }
}

/// Parses and decodes a raw log.
pub fn preprocess(raw_path: &Path, options: &ProcessingOptions) -> Result<(DecodedTable, Metadata)> {
    let (sections, found) = read_raw_data(raw_path, options)?;
    let section_count = sections.len();
    let assembled = convert_data(RawTable::concat(sections), options)?;

    let mut metadata = Metadata::default();
    metadata.push(SW_VERSION_KEY, SW_VERSION);
    metadata.push("source", raw_path.display().to_string());
    metadata.push("created", chrono::Utc::now().to_rfc3339());
    if let Some(device) = found.get("device") {
        metadata.push("device", device);
    }
    for line in found.get_all("hw_info") {
        metadata.push("hw_info", line);
    }
    let sensitivity = |v: Option<f64>| v.map_or_else(|| "missing".to_string(), |s| s.to_string());
    metadata.push("tip_sensitivity", sensitivity(assembled.calibration.tip));
    metadata.push("balloon_sensitivity", sensitivity(assembled.calibration.balloon));
    metadata.push("sections", section_count.to_string());
    metadata.push("rows", assembled.table.len().to_string());
    metadata.push("dropped_rows", assembled.dropped_rows.to_string());

    Ok((assembled.table, metadata))
}

/// Returns the path of an up-to-date preprocessed artifact for `path`,
/// regenerating it when missing or stale.
pub fn open_datafile(path: Option<&Path>, options: &ProcessingOptions) -> Result<PathBuf> {
    let path = path.ok_or(BeatError::NoDataFile)?;
    if is_preproc_artifact(path) {
        return Ok(path.to_path_buf());
    }

    let (artifact, meta_path) = preproc_paths(path);
    match cache_status(&artifact, &meta_path) {
        CacheStatus::Fresh => {
            info!("Using preprocessed file {}", artifact.display());
            return Ok(artifact);
        }
        CacheStatus::Missing => info!("No preprocessed file for {}", path.display()),
        CacheStatus::NoMetadata => info!("Preprocessed file has no metadata, regenerating"),
        CacheStatus::VersionMismatch(found) => {
            info!("Preprocessed file version {} is outdated, regenerating", found)
        }
    }

    let (table, metadata) = preprocess(path, options)?;
    write_preproc_data(&table, &artifact)?;
    fs::write(&meta_path, metadata.to_text())?;
    info!("Preprocessed file exported to {}", artifact.display());
    Ok(artifact)
}

pub fn write_preproc_data(table: &DecodedTable, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .from_writer(FileWriter::create(path)?);

    let mut header = vec![table.index_name.clone()];
    header.extend(table.columns.iter().map(|c| c.name.clone()));
    writer.write_record(&header)?;

    let mut record = Vec::with_capacity(header.len());
    for (row, time) in table.time.iter().enumerate() {
        record.clear();
        record.push(time.to_string());
        for column in &table.columns {
            record.push(match &column.data {
                ColumnData::Int(values) => values[row].to_string(),
                ColumnData::Text(values) => values[row].clone(),
            });
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| BeatError::Io(e.into_error()))?
        .finish()
}

pub fn read_preproc_data(path: &Path) -> Result<DecodedTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .has_headers(true)
        .from_reader(open_reader(path)?);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let (index_name, names) = header
        .split_first()
        .ok_or_else(|| BeatError::CorruptedCache("empty header".to_string()))?;

    let mut time = Vec::new();
    let mut ints: Vec<Vec<i64>> = vec![Vec::new(); names.len()];
    let mut texts: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    let is_text: Vec<bool> = names.iter().map(|n| EVENT_COLUMNS.contains(&n.as_str())).collect();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != header.len() {
            return Err(BeatError::CorruptedCache(format!("row {} has {} fields", row, record.len())));
        }
        time.push(parse_cell::<f64>(&record[0], index_name, row)?);
        for (c, cell) in record.iter().skip(1).enumerate() {
            if is_text[c] {
                texts[c].push(cell.to_string());
            } else {
                ints[c].push(parse_cell::<i64>(cell, &names[c], row)?);
            }
        }
    }

    let mut table = DecodedTable::new(time);
    table.index_name = index_name.clone();
    for (c, name) in names.iter().enumerate() {
        if is_text[c] {
            table.push_text(name.clone(), std::mem::take(&mut texts[c]));
        } else {
            table.push_int(name.clone(), std::mem::take(&mut ints[c]));
        }
    }
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

fn parse_cell<T: std::str::FromStr>(cell: &str, column: &str, row: usize) -> Result<T> {
    cell.trim().parse().map_err(|_| BeatError::Unconvertible {
        column: column.to_string(),
        row,
    })
}

pub fn read_metadata(artifact: &Path) -> Result<Metadata> {
    let meta_path = artifact.with_extension(META_EXTENSION);
    Metadata::from_text(&fs::read_to_string(meta_path)?)
}
