//! Event bank collecting the output of a generation run.

use std::fmt;

use crate::event::Event;

/// Counts above the detection threshold, tracked alongside the events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStats {
    /// Detection threshold in MeV.
    pub threshold: f64,
    /// Generated events with outgoing energy at or above the threshold.
    pub observed_above: u64,
    /// Expected number of events above the threshold, from the rate curve.
    pub expected_above: f64,
}

/// Generated events plus per-bin bookkeeping.
///
/// Events are stored in time-bin order. `binned_counts[i]` is the number of
/// events drawn for bin `i` and `expected_counts[i]` the Poisson mean it was
/// drawn from, so `binned_counts.iter().sum()` always equals `events.len()`.
#[derive(Debug, Clone, Default)]
pub struct EventBank {
    pub events: Vec<Event>,
    pub binned_counts: Vec<u64>,
    pub expected_counts: Vec<f64>,
    /// Present when threshold accounting was requested.
    pub threshold: Option<ThresholdStats>,
}

impl EventBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bins(n_bins: usize) -> Self {
        Self {
            events: Vec::new(),
            binned_counts: Vec::with_capacity(n_bins),
            expected_counts: Vec::with_capacity(n_bins),
            threshold: None,
        }
    }

    /// Append one generated event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Close out a time bin with its expected and drawn counts.
    pub fn record_bin(&mut self, expected: f64, drawn: u64) {
        self.expected_counts.push(expected);
        self.binned_counts.push(drawn);
    }

    /// Total number of generated events.
    pub fn total(&self) -> u64 {
        self.binned_counts.iter().sum()
    }

    /// Sum of the per-bin Poisson means.
    pub fn expected_total(&self) -> f64 {
        self.expected_counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Display for EventBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} particles (expected: {:.2} particles)",
            self.total(),
            self.expected_total()
        )?;
        if let Some(stats) = &self.threshold {
            write!(
                f,
                "\nAbove threshold of {} MeV: {} particles ({:.2} expected)",
                stats.threshold, stats.observed_above, stats.expected_above
            )?;
        }
        Ok(())
    }
}
