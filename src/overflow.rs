//! Capacity overflow diagnostics
//!
//! Whenever more data is selected than a fixed-capacity array can hold, the
//! excess is dropped and one of these is emitted. They are logged as they
//! happen and tallied in the run summary.

use std::fmt;

/// Which capacity was exceeded
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum OverflowKind {
    /// Generator-particle list
    GeneratorParticles,
    /// Jet list
    Jets,
    /// Fixed-width constituent row of the jet with this ordinal
    ConstituentRow {
        /// Jet ordinal
        jet: usize,
    },
    /// Flat jet → particle association arrays, while writing this jet
    Constituents {
        /// Jet ordinal
        jet: usize,
    },
}
//
impl OverflowKind {
    /// Short name used for tallies, ignoring the jet ordinal
    pub fn category(self) -> &'static str {
        match self {
            Self::GeneratorParticles => "generator particles",
            Self::Jets => "jets",
            Self::ConstituentRow { .. } => "constituent rows",
            Self::Constituents { .. } => "constituent links",
        }
    }
}

impl fmt::Display for OverflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstituentRow { jet } => write!(f, "constituent row of jet {jet}"),
            Self::Constituents { jet } => write!(f, "constituent links of jet {jet}"),
            other => write!(f, "{}", other.category()),
        }
    }
}

/// One overflow event
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Overflow {
    /// Event sequence number
    pub event: u64,
    /// What overflowed
    pub kind: OverflowKind,
    /// How many entries were dropped
    pub dropped: usize,
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {}: {} overflowed, {} entries dropped",
            self.event, self.kind, self.dropped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_jet() {
        let overflow = Overflow {
            event: 12,
            kind: OverflowKind::ConstituentRow { jet: 1 },
            dropped: 7,
        };
        assert_eq!(
            overflow.to_string(),
            "event 12: constituent row of jet 1 overflowed, 7 entries dropped"
        );
        assert_eq!(OverflowKind::Jets.to_string(), "jets");
        assert_eq!(
            OverflowKind::Constituents { jet: 4 }.category(),
            OverflowKind::Constituents { jet: 0 }.category()
        );
    }
}
