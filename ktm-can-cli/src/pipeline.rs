//! Capture decoding loop
//!
//! Reads frames from a capture, decodes them and writes the signals that pass
//! the filters (and, by default, only the ones whose value changed).

use crate::config::AppConfig;
use crate::log_reader::LogReader;
use crate::output::write_signal;
use crate::report::RunSummary;
use crate::state::ChangeTracker;
use anyhow::{Context, Result};
use ktm_can_decoder::Decoder;
use std::io::{BufRead, Write};

/// Decode a whole capture, returning the run summary
///
/// Frames the decoder rejects are logged and counted; they never stop the run.
pub fn run<R: BufRead, W: Write>(
    config: &AppConfig,
    input: R,
    out: &mut W,
) -> Result<RunSummary> {
    let decoder = Decoder::new(config.decoder);
    let mut tracker = ChangeTracker::new();
    let mut summary = RunSummary::new();
    let mut reader = LogReader::new(input);

    for record in reader.by_ref() {
        let record = record.context("Failed to read capture")?;
        summary.record_frame(record.timestamp);

        if !config.filter.should_process_frame(record.frame.identifier) {
            summary.frames_filtered += 1;
            continue;
        }

        let signals = match decoder.decode(&record.frame) {
            Ok(signals) => signals,
            Err(e) => {
                log::warn!("t={} {}: {}", record.timestamp, record.frame, e);
                summary.record_error(&e);
                continue;
            }
        };

        if signals.layout().is_none() {
            log::trace!("Unknown identifier: 0x{:03X}", record.frame.identifier);
            summary.unknown_frames += 1;
            continue;
        }
        summary.frames_decoded += 1;

        for signal in signals {
            summary.record_signal(signal.identifier);

            if !config.filter.should_emit(signal.name) {
                continue;
            }
            let changed = tracker.observe(&signal);
            if config.output.changes_only && !changed {
                continue;
            }

            write_signal(out, config.output.format, record.timestamp, &signal)
                .context("Failed to write output")?;
            summary.signals_printed += 1;
        }
    }

    summary.skipped_lines = reader.skipped();
    log::debug!("Tracked {} distinct signals", tracker.len());

    Ok(summary)
}
