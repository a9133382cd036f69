// Compression backends for raw logs and preprocessed tables

use crate::core::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
}

impl CompressionType {
    /// Infers the compression from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => CompressionType::Gzip,
            _ => CompressionType::None,
        }
    }
}

/// Opens a file for line reading, decompressing on the fly when needed.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    Ok(match CompressionType::from_path(path) {
        CompressionType::None => Box::new(BufReader::new(file)),
        CompressionType::Gzip => Box::new(BufReader::new(GzDecoder::new(file))),
    })
}

/// Writer that compresses according to the file extension.
pub enum FileWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl FileWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(match CompressionType::from_path(path) {
            CompressionType::None => FileWriter::Plain(file),
            CompressionType::Gzip => FileWriter::Gzip(GzEncoder::new(file, Compression::default())),
        })
    }

    /// Flushes buffers and writes the gzip trailer.
    pub fn finish(self) -> Result<()> {
        match self {
            FileWriter::Plain(mut w) => w.flush()?,
            FileWriter::Gzip(encoder) => encoder.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            FileWriter::Plain(w) => w.write(buf),
            FileWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            FileWriter::Plain(w) => w.flush(),
            FileWriter::Gzip(w) => w.flush(),
        }
    }
}
