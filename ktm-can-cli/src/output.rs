//! Rendering of decoded signals

use clap::ValueEnum;
use ktm_can_decoder::{Signal, SignalName, SignalValue};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, human-readable columns
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    timestamp: u64,
    identifier: u32,
    name: SignalName,
    value: &'a SignalValue,
}

/// Text line for a signal; the diagnostic is printed without a name
pub fn format_text(timestamp: u64, signal: &Signal) -> String {
    let name = match signal.name {
        SignalName::Unmapped => "",
        name => name.as_str(),
    };
    format!(
        "{:>6} {:03X} {:32} | {}",
        timestamp, signal.identifier, name, signal.value
    )
}

pub fn format_json(timestamp: u64, signal: &Signal) -> serde_json::Result<String> {
    serde_json::to_string(&JsonRecord {
        timestamp,
        identifier: signal.identifier,
        name: signal.name,
        value: &signal.value,
    })
}

/// Write one signal as a line in the chosen format
pub fn write_signal<W: Write>(
    out: &mut W,
    format: OutputFormat,
    timestamp: u64,
    signal: &Signal,
) -> io::Result<()> {
    let line = match format {
        OutputFormat::Text => format_text(timestamp, signal),
        OutputFormat::Json => format_json(timestamp, signal)?,
    };
    writeln!(out, "{}", line)
}
