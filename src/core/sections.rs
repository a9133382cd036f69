// Splits a raw device log into header-delimited sections

use crate::core::compression::open_reader;
use crate::core::constants::*;
use crate::core::error::{BeatError, Result};
use crate::core::format::{Metadata, RawLogLine, Section};
use crate::core::options::ProcessingOptions;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum ReaderState {
    AwaitingHeader,
    InSection { header: Vec<String>, rows: Vec<Vec<String>> },
}

#[derive(Debug)]
enum SectionEvent {
    HeaderLine(Vec<String>),
    DataLine(Vec<String>),
    EndOfStream,
}

/// Most recent event text of each kind, attached to the next data row.
#[derive(Debug, Default)]
struct PendingEvents {
    alarm: Option<String>,
    ui: Option<String>,
    wire: Option<String>,
}

impl PendingEvents {
    fn take(&mut self) -> [String; 3] {
        [
            self.alarm.take().unwrap_or_default(),
            self.ui.take().unwrap_or_default(),
            self.wire.take().unwrap_or_default(),
        ]
    }
}

pub struct SectionReader<'o> {
    options: &'o ProcessingOptions,
    state: ReaderState,
    sections: Vec<Section>,
    metadata: Metadata,
    pending: PendingEvents,
    in_banner: bool,
    line_no: usize,
}

impl<'o> SectionReader<'o> {
    pub fn new(options: &'o ProcessingOptions) -> Self {
        Self {
            options,
            state: ReaderState::AwaitingHeader,
            sections: Vec::new(),
            metadata: Metadata::default(),
            pending: PendingEvents::default(),
            in_banner: false,
            line_no: 0,
        }
    }

    pub fn classify<'a>(&self, line: &'a str) -> RawLogLine<'a> {
        if self.in_banner {
            return if line.trim() == HW_INFO_END {
                RawLogLine::MetadataMarker
            } else {
                RawLogLine::CommentRow(line)
            };
        }

        if line.trim() == HW_INFO_BEGIN {
            return RawLogLine::MetadataMarker;
        }

        if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            let fields: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
            let first = fields[0].trim();
            return if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
                RawLogLine::DataRow(fields)
            } else {
                RawLogLine::HeaderRow(fields)
            };
        }

        if let Some(rest) = line.strip_prefix(DEVICE_TAG) {
            RawLogLine::DeviceIdentity(rest.trim())
        } else if let Some(rest) = line.strip_prefix(ALARM_TAG) {
            RawLogLine::AlarmEvent(rest.trim())
        } else if let Some(rest) = line.strip_prefix(UI_TAG) {
            RawLogLine::UiEvent(rest.trim())
        } else if let Some(rest) = line.strip_prefix(self.options.wire_tag.as_str()) {
            RawLogLine::WireEvent(rest.trim())
        } else {
            RawLogLine::Other
        }
    }

    pub fn feed(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let line = line.trim_end_matches(['\r', '\n']);

        match self.classify(line) {
            RawLogLine::MetadataMarker => self.in_banner = !self.in_banner,
            RawLogLine::CommentRow(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    self.metadata.push("hw_info", text);
                }
            }
            RawLogLine::DeviceIdentity(id) => {
                if self.metadata.get("device").is_none() {
                    self.metadata.push("device", id);
                }
            }
            RawLogLine::AlarmEvent(text) => self.pending.alarm = Some(text.to_string()),
            RawLogLine::UiEvent(text) => self.pending.ui = Some(text.to_string()),
            RawLogLine::WireEvent(text) => self.pending.wire = Some(text.to_string()),
            RawLogLine::HeaderRow(fields) => {
                let header = fields.into_iter().map(str::to_string).collect();
                self.transition(SectionEvent::HeaderLine(header))?;
            }
            RawLogLine::DataRow(fields) => {
                let row = fields.into_iter().map(str::to_string).collect();
                self.transition(SectionEvent::DataLine(row))?;
            }
            RawLogLine::Other => {}
        }
        Ok(())
    }

    fn transition(&mut self, event: SectionEvent) -> Result<()> {
        let line = self.line_no;
        let state = std::mem::replace(&mut self.state, ReaderState::AwaitingHeader);

        self.state = match (state, event) {
            (ReaderState::AwaitingHeader, SectionEvent::HeaderLine(mut header)) => {
                header.extend(EVENT_COLUMNS.iter().map(|c| c.to_string()));
                ReaderState::InSection { header, rows: Vec::new() }
            }
            (ReaderState::AwaitingHeader, SectionEvent::DataLine(_)) => {
                return Err(BeatError::NoHeader { line });
            }
            (ReaderState::AwaitingHeader, SectionEvent::EndOfStream) => ReaderState::AwaitingHeader,
            // Any non-numeric index closes the section; the first header stays active
            (ReaderState::InSection { header, rows }, SectionEvent::HeaderLine(next)) => {
                let raw_width = header.len() - EVENT_COLUMNS.len();
                let repeat = next.len() == raw_width
                    && next.iter().zip(&header).all(|(a, b)| a.trim() == b.trim());
                if !repeat {
                    warn!("Line {}: unexpected header or corrupted index, section closed", line);
                }
                self.close_section(header.clone(), rows);
                ReaderState::InSection { header, rows: Vec::new() }
            }
            (ReaderState::InSection { header, mut rows }, SectionEvent::DataLine(mut row)) => {
                let raw_width = header.len() - EVENT_COLUMNS.len();
                if row.len() != raw_width {
                    return Err(BeatError::format(
                        line,
                        format!("expected {} fields, found {}", raw_width, row.len()),
                    ));
                }
                row.extend(self.pending.take());
                rows.push(row);
                ReaderState::InSection { header, rows }
            }
            (ReaderState::InSection { header, rows }, SectionEvent::EndOfStream) => {
                self.close_section(header, rows);
                ReaderState::AwaitingHeader
            }
        };
        Ok(())
    }

    fn close_section(&mut self, header: Vec<String>, rows: Vec<Vec<String>>) {
        if rows.is_empty() {
            return;
        }
        debug!("Section {} closed with {} rows", self.sections.len() + 1, rows.len());
        self.sections.push(Section { header, rows });
    }

    pub fn finish(mut self) -> Result<(Vec<Section>, Metadata)> {
        self.transition(SectionEvent::EndOfStream)?;
        if self.sections.is_empty() {
            return Err(BeatError::format(self.line_no, "log contains no data rows"));
        }
        Ok((self.sections, self.metadata))
    }
}

pub fn read_sections<R: BufRead>(reader: R, options: &ProcessingOptions) -> Result<(Vec<Section>, Metadata)> {
    let mut section_reader = SectionReader::new(options);
    for line in reader.lines() {
        section_reader.feed(&line?)?;
    }
    section_reader.finish()
}

pub fn read_raw_data(path: &Path, options: &ProcessingOptions) -> Result<(Vec<Section>, Metadata)> {
    let (sections, metadata) = read_sections(open_reader(path)?, options)?;
    info!("Data read successfully, {} sections detected", sections.len());
    Ok((sections, metadata))
}
