//! Run summary report
//!
//! Counts what happened while decoding a capture and renders it as text.

use chrono::{DateTime, Utc};
use ktm_can_decoder::{DecoderError, FrameLayout};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug)]
pub struct RunSummary {
    started: DateTime<Utc>,
    pub records: usize,
    pub skipped_lines: usize,
    pub frames_decoded: usize,
    pub frames_filtered: usize,
    pub unknown_frames: usize,
    pub errors: BTreeMap<&'static str, usize>,
    pub signals_per_id: BTreeMap<u32, usize>,
    pub signals_printed: usize,
    first_timestamp: Option<u64>,
    last_timestamp: Option<u64>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            records: 0,
            skipped_lines: 0,
            frames_decoded: 0,
            frames_filtered: 0,
            unknown_frames: 0,
            errors: BTreeMap::new(),
            signals_per_id: BTreeMap::new(),
            signals_printed: 0,
            first_timestamp: None,
            last_timestamp: None,
        }
    }

    pub fn record_frame(&mut self, timestamp: u64) {
        self.records += 1;
        self.first_timestamp.get_or_insert(timestamp);
        self.last_timestamp = Some(timestamp);
    }

    pub fn record_error(&mut self, error: &DecoderError) {
        *self.errors.entry(error.kind()).or_insert(0) += 1;
    }

    pub fn record_signal(&mut self, identifier: u32) {
        *self.signals_per_id.entry(identifier).or_insert(0) += 1;
    }

    pub fn total_errors(&self) -> usize {
        self.errors.values().sum()
    }

    /// Capture timestamps covered, in capture units
    pub fn span(&self) -> Option<u64> {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => Some(last.saturating_sub(first)),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        let finished = Utc::now();
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = self.render_into(&mut out, finished);
        out
    }

    fn render_into(&self, out: &mut String, finished: DateTime<Utc>) -> std::fmt::Result {
        writeln!(out, "\n=== DECODING SUMMARY ===")?;
        writeln!(
            out,
            "Generated: {}",
            finished.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            out,
            "Decode time: {} ms",
            (finished - self.started).num_milliseconds()
        )?;
        writeln!(out, "Frames read: {}", self.records)?;
        writeln!(out, "Lines skipped: {}", self.skipped_lines)?;
        writeln!(out, "Frames filtered out: {}", self.frames_filtered)?;
        writeln!(out, "Frames decoded: {}", self.frames_decoded)?;
        writeln!(
            out,
            "Frames with unknown identifier: {}",
            self.unknown_frames
        )?;
        writeln!(out, "Frames rejected: {}", self.total_errors())?;
        for (kind, count) in &self.errors {
            writeln!(out, "  {}: {}", kind, count)?;
        }
        if let Some(span) = self.span() {
            writeln!(out, "Capture span: {} (timestamp units)", span)?;
        }
        writeln!(out, "Signals printed: {}", self.signals_printed)?;

        if !self.signals_per_id.is_empty() {
            writeln!(out, "\nSignals decoded per identifier:")?;
            for (identifier, count) in &self.signals_per_id {
                let description = FrameLayout::from_identifier(*identifier)
                    .map(|l| l.description())
                    .unwrap_or("unknown");
                writeln!(out, "  0x{:03X} {:>8}  {}", identifier, count, description)?;
            }
        }

        Ok(())
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_span() {
        let mut summary = RunSummary::new();
        summary.record_frame(100);
        summary.record_frame(180);
        summary.record_signal(0x120);
        summary.record_signal(0x120);
        summary.record_error(&DecoderError::InsufficientPayload {
            identifier: 0x129,
            required: 1,
            actual: 0,
        });

        assert_eq!(summary.records, 2);
        assert_eq!(summary.span(), Some(80));
        assert_eq!(summary.signals_per_id[&0x120], 2);
        assert_eq!(summary.total_errors(), 1);
    }

    #[test]
    fn test_render_lists_identifiers() {
        let mut summary = RunSummary::new();
        summary.record_signal(0x540);
        summary.record_error(&DecoderError::UnexpectedConstant {
            identifier: 0x540,
            index: 0,
            expected: 0x02,
            actual: 0x00,
        });

        let text = summary.render();
        assert!(text.contains("=== DECODING SUMMARY ==="));
        assert!(text.contains("unexpected_constant: 1"));
        assert!(text.contains("0x540"));
        assert!(text.contains("coolant temperature"));
        assert!(!text.contains("Capture span"));
    }
}
