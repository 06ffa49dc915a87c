//! Typed errors of the projection pipeline

use thiserror::Error;

/// Logic errors detected while projecting an event. All of them are fatal to
/// the run: continuing would emit rows pointing at the wrong particles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A jet constituent has no entry in the compact generator-particle list
    #[error("event {event}: constituent with native index {tag} is not in the generator list")]
    UnmappedConstituent {
        /// Event sequence number
        event: u64,
        /// Native index carried by the constituent
        tag: usize,
    },

    /// A jet constituent tag does not name any particle of the event
    #[error("event {event}: constituent tag {tag} does not name a particle of the event")]
    UnknownParticle {
        /// Event sequence number
        event: u64,
        /// Tag carried by the constituent
        tag: usize,
    },
}

/// Inconsistent output schema description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema '{name}': {reason}")]
pub struct SchemaError {
    /// Name of the offending schema
    pub name: String,
    /// What is inconsistent about it
    pub reason: &'static str,
}

/// Malformed invocation. Reported with the usage message, not as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// Fewer positional arguments than required
    #[error("expected at least {expected} arguments, got {found}")]
    MissingArguments {
        /// Minimal number of positional arguments
        expected: usize,
        /// Number of positional arguments given
        found: usize,
    },

    /// A positional argument could not be parsed
    #[error("could not parse {name} from '{value}'")]
    BadArgument {
        /// Name of the parameter
        name: &'static str,
        /// Text that failed to parse
        value: String,
    },

    /// The schema preset name is not known
    #[error("unknown schema preset '{0}'")]
    UnknownPreset(String),
}
