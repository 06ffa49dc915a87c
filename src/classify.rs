//! Decide, for each particle of an event, whether it is written to the
//! generator-particle list, fed to the jet clustering, or both

use crate::{event::Event, numeric::Float, particle::Particle};

/// Outcome of classifying one particle
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Neither written out nor clustered
    Skip,
    /// Written to the generator-particle list only
    Generator,
    /// Fed to the clustering only
    Cluster,
    /// Written out and clustered
    Both,
}
//
impl Selection {
    /// Build a selection from the two independent decisions
    pub fn from_decisions(generator: bool, cluster: bool) -> Self {
        match (generator, cluster) {
            (false, false) => Self::Skip,
            (true, false) => Self::Generator,
            (false, true) => Self::Cluster,
            (true, true) => Self::Both,
        }
    }

    /// Does this particle go to the generator-particle list?
    pub fn keeps_generator(self) -> bool {
        matches!(self, Self::Generator | Self::Both)
    }

    /// Does this particle go to the clustering?
    pub fn keeps_cluster(self) -> bool {
        matches!(self, Self::Cluster | Self::Both)
    }
}

/// Which particles make it into the generator-particle list
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GeneratorSelection {
    /// Every particle of the event, unconditionally
    All,
    /// Final, final at parton level, or resonance, plus optionally any hadron
    Standard {
        /// Also keep every hadron
        hadrons: bool,
    },
    /// Final at parton level or resonance only
    PartonLevel {
        /// Leave gluons out
        exclude_gluons: bool,
    },
}
//
impl GeneratorSelection {
    /// Decide generator-list membership for one particle
    pub fn keep(&self, p: &Particle) -> bool {
        match *self {
            Self::All => true,
            Self::Standard { hadrons } => {
                p.is_final() || p.final_parton_level || p.resonance || (hadrons && p.is_hadron())
            }
            Self::PartonLevel { exclude_gluons } => {
                (p.final_parton_level || p.resonance) && !(exclude_gluons && p.is_gluon())
            }
        }
    }

    /// Is every final-state particle guaranteed to be selected?
    pub fn covers_final_state(&self) -> bool {
        matches!(self, Self::All | Self::Standard { .. })
    }
}

/// Which particles are fed to the clustering
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClusterSelection {
    /// Pseudorapidity acceptance |eta| < max_abs_eta, if any
    pub max_abs_eta: Option<Float>,

    /// Leave out final-state particles whose first mother is a Z or W boson
    pub remove_boson_daughters: bool,

    /// Only consider particles that did not make it into the generator list
    pub exclusive: bool,
}
//
impl ClusterSelection {
    /// Every final-state particle, independently of the generator list
    pub const fn final_state() -> Self {
        Self {
            max_abs_eta: None,
            remove_boson_daughters: false,
            exclusive: false,
        }
    }

    /// Decide clustering membership for one particle
    pub fn keep(&self, p: &Particle, event: &Event) -> bool {
        if !p.is_final() {
            return false;
        }
        if let Some(max_abs_eta) = self.max_abs_eta {
            if p.eta().abs() >= max_abs_eta {
                return false;
            }
        }
        if self.remove_boson_daughters {
            let from_boson = event.mother(p).map_or(false, Particle::is_electroweak_boson);
            if from_boson {
                tracing::trace!(index = p.index, "daughter of an electroweak boson kept out of jets");
                return false;
            }
        }
        true
    }
}

/// Particle classifier, a pure predicate evaluated once per particle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Classifier {
    /// Generator-list rule
    pub generator: GeneratorSelection,
    /// Clustering rule
    pub cluster: ClusterSelection,
}
//
impl Classifier {
    /// Classify one particle of `event`
    pub fn classify(&self, p: &Particle, event: &Event) -> Selection {
        let generator = self.generator.keep(p);
        let cluster = !(self.cluster.exclusive && generator) && self.cluster.keep(p, event);
        Selection::from_decisions(generator, cluster)
    }

    /// Is every clustering input guaranteed to also be in the generator list?
    /// Jet constituents can only be resolved to compact indices if so.
    pub fn cluster_inputs_are_listed(&self) -> bool {
        !self.cluster.exclusive && self.generator.covers_final_state()
    }
}
