//! Signal change tracking
//!
//! Remembers the last value seen for every (identifier, name) pair so the
//! output only shows values that moved.

use ktm_can_decoder::{Signal, SignalName, SignalValue};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ChangeTracker {
    last_values: HashMap<(u32, SignalName), SignalValue>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signal; returns true if it is new or its value changed
    pub fn observe(&mut self, signal: &Signal) -> bool {
        let key = (signal.identifier, signal.name);
        match self.last_values.get(&key) {
            Some(previous) if *previous == signal.value => false,
            _ => {
                self.last_values.insert(key, signal.value.clone());
                true
            }
        }
    }

    /// Number of distinct signals seen
    pub fn len(&self) -> usize {
        self.last_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpm(identifier: u32, value: i64) -> Signal {
        Signal::new(identifier, SignalName::Rpm, SignalValue::Integer(value))
    }

    #[test]
    fn test_reports_first_sighting_and_changes_only() {
        let mut tracker = ChangeTracker::new();

        assert!(tracker.observe(&rpm(0x120, 1657)));
        assert!(!tracker.observe(&rpm(0x120, 1657)));
        assert!(tracker.observe(&rpm(0x120, 1700)));
        assert!(tracker.observe(&rpm(0x120, 1657)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_same_name_on_different_identifiers_tracked_separately() {
        let mut tracker = ChangeTracker::new();

        assert!(tracker.observe(&rpm(0x120, 1657)));
        assert!(tracker.observe(&rpm(0x540, 1657)));
        assert_eq!(tracker.len(), 2);
    }
}
