//! Event loop
//!
//! Requests events one at a time, projects each into the reused record, and
//! appends the record to the output when the schema's gate lets it through.

use crate::{
    cluster::Clustering,
    evgen::EventGenerator,
    output::RowSink,
    overflow::{Overflow, OverflowKind},
    packer::Packer,
    Result,
};
use std::collections::BTreeMap;

/// Overflow tally for one category
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OverflowTally {
    /// Number of overflow reports
    pub occurrences: u64,
    /// Total number of dropped entries
    pub dropped: u64,
}

/// What happened during a run
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Number of events requested from the generator
    pub requested: u64,
    /// Number of aborted generations
    pub aborted: u64,
    /// Number of rows appended to the output
    pub emitted: u64,
    /// Number of generated events that the emission gate rejected
    pub gated: u64,
    /// Overflow tallies, keyed by overflow category
    pub overflows: BTreeMap<&'static str, OverflowTally>,
}
//
impl RunStats {
    /// Account for one overflow report
    pub fn record_overflow(&mut self, overflow: &Overflow) {
        let tally = self.overflows.entry(overflow.kind.category()).or_default();
        tally.occurrences += 1;
        tally.dropped += overflow.dropped as u64;
    }

    /// Tally of one overflow kind
    pub fn overflow_tally(&self, kind: OverflowKind) -> OverflowTally {
        self.overflows
            .get(kind.category())
            .copied()
            .unwrap_or_default()
    }
}

/// Run the event loop for `num_events` requested events
///
/// Aborted generations consume one requested event but give no row. The sink
/// is only filled here: finishing it is the caller's job.
///
pub fn run_events<C: Clustering>(
    generator: &mut impl EventGenerator,
    packer: &mut Packer<C>,
    sink: &mut impl RowSink,
    num_events: u64,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    let mut record = packer.new_record();
    let mut overflows = Vec::new();
    for event_num in 0..num_events {
        stats.requested += 1;
        let Some(event) = generator.next_event()? else {
            tracing::debug!(event = event_num, "event generation aborted");
            stats.aborted += 1;
            continue;
        };

        let emit = packer.pack(event_num, &event, &mut record, &mut overflows)?;
        for overflow in overflows.drain(..) {
            tracing::warn!(%overflow, "capacity overflow");
            stats.record_overflow(&overflow);
        }

        if emit {
            sink.fill(&record.row())?;
            stats.emitted += 1;
        } else {
            stats.gated += 1;
        }
    }
    Ok(stats)
}
