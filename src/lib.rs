//! evproj: projection of simulated collision events into tabular records
//!
//!
//! # Introduction (for the physicist)
//!
//! An event generator produces simulated proton-proton collisions, one event
//! at a time, as a forest of particles. This program turns each event into one
//! row of an analysis table: a bounded list of generator-level particles, the
//! jets clustered from the final-state particles, and the links between the
//! two.
//!
//! Jets that are really isolated leptons (e.g. from a Z → ℓℓ decay) are
//! vetoed, and jets can be groomed with soft drop to get a better-behaved
//! mass.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Every run follows the same procedural flow:
//!
//! * read in parameters and configure the event generator
//! * loop over events,
//!     * classify every particle as written out and/or clustered,
//!     * cluster, filter and groom the jets,
//!     * pack everything into a fixed-capacity record,
//!     * append the record to the output table if it passes the gate
//! * then flush the table and display run statistics.
//!
//! What is written out, with which capacities and filters, is described by an
//! output `Schema`. Five presets cover the usual use cases.

#![warn(missing_docs)]

pub mod classify;
pub mod cluster;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod evgen;
pub mod groom;
pub mod jetcut;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod overflow;
pub mod packer;
pub mod particle;
pub mod record;
pub mod remap;
pub mod schema;

use crate::{
    cluster::{Clustering, SequentialRecombination},
    config::Configuration,
    driver::RunStats,
    evgen::{EventGenerator, LhefGenerator},
    output::{RowSink, TableWriter},
    packer::Packer,
};

/// We'll use eyre's type-erased result type throughout the application
pub type Result<T> = eyre::Result<T>;

/// Run the whole projection described by a configuration
pub fn run(config: &Configuration) -> Result<RunStats> {
    // Configure the event generator, seed first, then the configuration file
    let mut generator = LhefGenerator::new();
    config.configure(&mut generator)?;
    generator.init()?;

    // Set up the projection and its output
    let mut packer = Packer::new(config.schema(), SequentialRecombination::new())?;
    let mut sink = TableWriter::create(&config.output_file, packer.schema())?;

    run_with(&mut generator, &mut packer, &mut sink, config.num_events)
}

/// Run the event loop with given collaborators, then finish the sink and
/// report generator statistics
///
/// The sink is finished and the statistics are reported whether or not the
/// event loop failed. If both the loop and the sink fail, the event loop's
/// error is the one reported.
///
pub fn run_with<C: Clustering>(
    generator: &mut impl EventGenerator,
    packer: &mut Packer<C>,
    sink: &mut impl RowSink,
    num_events: u64,
) -> Result<RunStats> {
    tracing::info!(schema = %packer.schema().name, num_events, "starting event loop");
    let outcome = driver::run_events(generator, packer, sink, num_events);
    let finished = sink.finish();
    generator.stat();
    let stats = outcome?;
    finished?;
    tracing::info!(emitted = stats.emitted, aborted = stats.aborted, "event loop done");
    Ok(stats)
}
