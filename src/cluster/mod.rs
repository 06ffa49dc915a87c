//! Jet clustering interface
//!
//! The projection pipeline only sees the `Clustering` trait: a list of tagged
//! 4-momenta goes in, pt-ordered jets that remember their tagged constituents
//! come out, and jets can be groomed with soft drop. The sequential
//! recombination back-end below drives the `jetty` crate.

mod recombination;

pub use self::recombination::SequentialRecombination;

use crate::{
    momentum::{self, Momentum, E},
    numeric::Float,
};
use std::{cmp::Ordering, fmt};

/// Sequential recombination jet algorithms
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}
//
impl fmt::Display for JetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AntiKt => "anti-kt",
            Self::CambridgeAachen => "Cambridge/Aachen",
            Self::Kt => "kt",
        };
        write!(f, "{name}")
    }
}

/// Jet definition: algorithm, radius, and the minimal transverse momentum of
/// the inclusive jets that are kept
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: Float,
    /// Minimum jet transverse momentum
    pub min_pt: Float,
}
//
impl JetDefinition {
    /// Anti-kt jets of a given radius above a given transverse momentum
    pub const fn anti_kt(radius: Float, min_pt: Float) -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius,
            min_pt,
        }
    }
}

/// Soft drop grooming parameters
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SoftDrop {
    /// Angular exponent β
    pub beta: Float,
    /// Energy-fraction cut z
    pub z_cut: Float,
    /// Reference radius R₀
    pub r0: Float,
}
//
impl SoftDrop {
    /// Soft drop with the default reference radius R₀ = 1
    pub const fn new(beta: Float, z_cut: Float) -> Self {
        Self {
            beta,
            z_cut,
            r0: 1.,
        }
    }
}

/// Clustering input: a 4-momentum tagged with the native index of the
/// particle it comes from
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constituent {
    /// 4-momentum
    pub p: Momentum,
    /// User tag (native event index)
    pub tag: usize,
}

/// Clustered jet
#[derive(Clone, Debug, PartialEq)]
pub struct Jet {
    /// Aggregated 4-momentum
    pub p: Momentum,
    /// Constituents, in clustering-history order
    pub constituents: Vec<Constituent>,
}
//
impl Jet {
    /// Transverse momentum
    pub fn pt(&self) -> Float {
        momentum::pt(&self.p)
    }

    /// Pseudorapidity
    pub fn eta(&self) -> Float {
        momentum::eta(&self.p)
    }

    /// Azimuth in [0, 2π)
    pub fn phi(&self) -> Float {
        momentum::phi(&self.p)
    }

    /// Invariant mass
    pub fn m(&self) -> Float {
        momentum::m(&self.p)
    }

    /// Energy
    pub fn e(&self) -> Float {
        self.p[E]
    }
}

/// A jet clustering back-end
pub trait Clustering {
    /// Cluster `inputs` and return the inclusive jets with pt ≥ `min_pt`,
    /// sorted by decreasing transverse momentum
    fn inclusive_jets(&self, inputs: &[Constituent], definition: &JetDefinition) -> Vec<Jet>;

    /// Remove soft wide-angle radiation from a jet
    fn soft_drop(&self, jet: &Jet, params: &SoftDrop) -> Jet;
}

/// Sort jets by decreasing transverse momentum, keeping the relative order of
/// jets with equal pt
pub fn sort_by_pt(jets: &mut [Jet]) {
    jets.sort_by(|a, b| b.pt().partial_cmp(&a.pt()).unwrap_or(Ordering::Equal));
}
