use beat_reader::ProcessingOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Log opened at startup when no path is given on the command line.
    pub data_file: Option<String>,
    pub connection: Connection,
    pub processing: ProcessingOptions,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            name: "BEAT visualization tool".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Decodes BEAT device logs for plotting".to_string(),
            data_file: None,
            connection: Connection::default(),
            processing: ProcessingOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub ip: String,
    pub port: u16,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 8050,
        }
    }
}
