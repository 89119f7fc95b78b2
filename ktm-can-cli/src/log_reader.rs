//! CSV capture reader
//!
//! Captures are plain text, one frame per line:
//!
//! ```text
//! Timestamp,ID,Data0,Data1,Data2,Data3,Data4,Data5,Data6,Data7,
//! 1520,120,06,79,00,00,00,00,00,3F
//! ```
//!
//! The timestamp is decimal, the identifier and data bytes hexadecimal. Lines
//! that do not parse (headers, comments, blank lines) are skipped.

use ktm_can_decoder::{Frame, PAYLOAD_LEN};
use std::io::{self, BufRead};

/// One frame read from a capture, with its capture timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: u64,
    pub frame: Frame,
}

/// Reasons a capture line is not a frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("line is not valid UTF-8")]
    Encoding,

    #[error("expected a timestamp and an identifier")]
    MissingFields,

    #[error("invalid timestamp {0:?}")]
    Timestamp(String),

    #[error("invalid identifier {0:?}")]
    Identifier(String),

    #[error("invalid data byte {0:?}")]
    DataByte(String),

    #[error("{0} data bytes, at most {max} allowed", max = PAYLOAD_LEN)]
    TooManyBytes(usize),
}

/// Parse a single capture line
pub fn parse_line(line: &str) -> Result<LogRecord, LineError> {
    let mut fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    while fields.last() == Some(&"") {
        fields.pop();
    }

    if fields.len() < 2 {
        return Err(LineError::MissingFields);
    }

    let timestamp = fields[0]
        .parse::<u64>()
        .map_err(|_| LineError::Timestamp(fields[0].to_string()))?;

    let identifier = u32::from_str_radix(strip_hex_prefix(fields[1]), 16)
        .map_err(|_| LineError::Identifier(fields[1].to_string()))?;

    let data = &fields[2..];
    if data.len() > PAYLOAD_LEN {
        return Err(LineError::TooManyBytes(data.len()));
    }

    let payload = data
        .iter()
        .map(|b| u8::from_str_radix(b, 16).map_err(|_| LineError::DataByte(b.to_string())))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(LogRecord {
        timestamp,
        frame: Frame::new(identifier, payload),
    })
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a raw capture line that may contain stray non-UTF-8 bytes
pub fn parse_raw_line(line: &[u8]) -> Result<LogRecord, LineError> {
    let line = std::str::from_utf8(line).map_err(|_| LineError::Encoding)?;
    parse_line(line)
}

/// Iterator over the frames of a capture
///
/// Unparsable lines are logged at debug level and counted, never returned.
/// Only I/O errors from the underlying reader are passed on.
pub struct LogReader<R> {
    lines: io::Split<R>,
    line_number: usize,
    skipped: usize,
}

impl<R: BufRead> LogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Number of lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = io::Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            match parse_raw_line(&line) {
                Ok(record) => return Some(Ok(record)),
                Err(e) => {
                    log::debug!("Skipping line {}: {}", self.line_number, e);
                    self.skipped += 1;
                }
            }
        }
    }
}
