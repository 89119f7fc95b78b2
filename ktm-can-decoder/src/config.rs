//! Decoder configuration types
//!
//! The decoder is intentionally simple - capture handling, change tracking and
//! presentation belong to the application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Emit one `unmapped` diagnostic signal per known frame
    #[serde(default)]
    pub emit_unmapped: bool,

    /// Reject frames whose constant bytes differ from the known layout
    ///
    /// Only meant to be switched off while exploring captures from a bike whose
    /// layout is suspected to differ.
    #[serde(default = "default_true")]
    pub check_invariants: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            emit_unmapped: false,
            check_invariants: true,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable the unmapped diagnostic
    pub fn with_unmapped(mut self, enabled: bool) -> Self {
        self.emit_unmapped = enabled;
        self
    }

    /// Builder method: enable or disable constant byte checks
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }
}
