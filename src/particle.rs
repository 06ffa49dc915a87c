//! Particle records as delivered by the event generator, and the identity
//! and status predicates the projection rules are written in terms of

use crate::{
    momentum::{self, Momentum},
    numeric::Float,
};
use nalgebra::Vector3;

/// Identity code of the event-record "system" entry at native index 0
pub const SYSTEM_ID: i32 = 90;

/// Identity code of the gluon
pub const GLUON_ID: i32 = 21;

/// Identity code of the Z⁰ boson
pub const Z0_ID: i32 = 23;

/// Identity code of the W± boson
pub const W_ID: i32 = 24;

/// Identity codes of particles that leave no trace in a detector, following
/// the event generator's particle data table. Neutral bosons and neutral BSM
/// states are treated as invisible whatever they decay to.
const INVISIBLE_IDS: [i32; 62] = [
    12, 14, 16, 18, 23, 25, 32, 33, 35, 36, 39, 41, 45, 46, 51, 52, 53, 54, 55, 56, 57, 58, 59,
    60, 1000012, 1000014, 1000016, 1000018, 1000022, 1000023, 1000025, 1000035, 1000045,
    1000039, 2000012, 2000014, 2000016, 2000018, 4900012, 4900014, 4900016, 4900021, 4900022,
    4900101, 4900102, 4900103, 4900104, 4900105, 4900106, 4900107, 4900108, 4900111, 4900113,
    4900211, 4900213, 4900991, 5000039, 5100039, 9900012, 9900014, 9900016, 9900023,
];

/// One entry of a generated event
///
/// Native indices are assigned by the generator and are unique within an
/// event. Relational indices (mothers, daughters) refer to native indices,
/// with 0 reserved for "no relation".
///
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Native index within the event
    pub index: usize,

    /// Particle-type identity code
    pub id: i32,

    /// Status code (positive for particles remaining in the final state)
    pub status: i32,

    /// Cartesian 4-momentum
    pub p: Momentum,

    /// Generated mass
    pub m: Float,

    /// Production vertex
    pub vertex: Vector3<Float>,

    /// Proper lifetime
    pub tau: Float,

    /// First and second mother indices
    pub mothers: [usize; 2],

    /// First and last daughter indices
    pub daughters: [usize; 2],

    /// Colour-line identifier
    pub col: i32,

    /// Whether the generator considers this particle a short-lived resonance
    pub resonance: bool,

    /// Whether this particle was final at the end of the parton level
    pub final_parton_level: bool,
}
//
impl Particle {
    /// Build a particle with the given identity, status and momentum, no
    /// relations and no displacement. The mass is computed from `p`.
    pub fn new(id: i32, status: i32, p: Momentum) -> Self {
        Self {
            index: 0,
            id,
            status,
            m: momentum::m(&p).max(0.),
            p,
            vertex: Vector3::zeros(),
            tau: 0.,
            mothers: [0; 2],
            daughters: [0; 2],
            col: 0,
            resonance: false,
            final_parton_level: false,
        }
    }

    /// Set the mother indices
    pub fn with_mothers(mut self, mother1: usize, mother2: usize) -> Self {
        self.mothers = [mother1, mother2];
        self
    }

    /// Set the daughter index range
    pub fn with_daughters(mut self, daughter1: usize, daughter2: usize) -> Self {
        self.daughters = [daughter1, daughter2];
        self
    }

    /// Absolute value of the identity code
    pub fn id_abs(&self) -> i32 {
        self.id.abs()
    }

    /// Is this particle part of the final state?
    pub fn is_final(&self) -> bool {
        self.status > 0
    }

    /// Is this particle a hadron, judging by its identity code?
    pub fn is_hadron(&self) -> bool {
        let id = self.id_abs();
        if id <= 100 || (1000000..=9000000).contains(&id) || id >= 9900000 {
            return false;
        }
        if id == 130 || id == 310 {
            return true;
        }
        !(id % 10 == 0 || (id / 10) % 10 == 0 || (id / 100) % 10 == 0)
    }

    /// Could this particle be seen by a detector?
    pub fn is_visible(&self) -> bool {
        !INVISIBLE_IDS.contains(&self.id_abs())
    }

    /// Does the identity code fall in the charged-lepton window used by the
    /// jet lepton veto? (11 to 15, neutrinos 12 and 14 included)
    pub fn is_lepton_like(&self) -> bool {
        (11..=15).contains(&self.id_abs())
    }

    /// Is this an electroweak Z or W boson?
    pub fn is_electroweak_boson(&self) -> bool {
        matches!(self.id_abs(), Z0_ID | W_ID)
    }

    /// Is this a gluon?
    pub fn is_gluon(&self) -> bool {
        self.id_abs() == GLUON_ID
    }

    /// Transverse momentum
    pub fn pt(&self) -> Float {
        momentum::pt(&self.p)
    }

    /// Pseudorapidity
    pub fn eta(&self) -> Float {
        momentum::eta(&self.p)
    }

    /// Azimuth in (-π, π]
    pub fn phi(&self) -> Float {
        momentum::phi_signed(&self.p)
    }

    /// Derived 4-bit flag word: isHadron, isFinal, isFinalPartonLevel and
    /// isVisible in bits 3 to 0
    pub fn flags(&self) -> i32 {
        (self.is_hadron() as i32) << 3
            | (self.is_final() as i32) << 2
            | (self.final_parton_level as i32) << 1
            | (self.is_visible() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::momentum;

    fn particle(id: i32, status: i32) -> Particle {
        Particle::new(id, status, momentum(1., 0., 0., 2.))
    }

    #[test]
    fn hadron_identification() {
        for id in [211, -211, 111, 130, 310, 321, 2212, -2112, 443, 3122] {
            assert!(particle(id, 1).is_hadron(), "{id} should be a hadron");
        }
        for id in [1, 11, 21, 22, 23, 90, 1000022, 2101, 9900012] {
            assert!(!particle(id, 1).is_hadron(), "{id} should not be a hadron");
        }
    }

    #[test]
    fn visibility() {
        assert!(particle(11, 1).is_visible());
        assert!(particle(22, 1).is_visible());
        assert!(!particle(-12, 1).is_visible());
        assert!(!particle(1000022, 1).is_visible());
        assert!(!particle(4900101, 1).is_visible());
        assert!(particle(24, -22).is_visible());
    }

    #[test]
    fn neutral_bosons_are_invisible() {
        for id in [23, 25, 32, 35, 36, 1000023, 2000012] {
            let boson = particle(id, -22);
            assert!(!boson.is_visible(), "{id} should be invisible");
            assert_eq!(boson.flags() & 1, 0);
        }
    }

    #[test]
    fn lepton_window() {
        assert!(particle(-11, 1).is_lepton_like());
        assert!(particle(15, 1).is_lepton_like());
        assert!(!particle(16, 1).is_lepton_like());
        assert!(!particle(10, 1).is_lepton_like());
    }

    #[test]
    fn flag_word_packs_four_bits() {
        let mut pion = particle(211, 1);
        pion.final_parton_level = true;
        assert_eq!(pion.flags(), 0b1111);

        let neutrino_from_hard_process = particle(12, -23);
        assert_eq!(neutrino_from_hard_process.flags(), 0);

        let mut lepton = particle(11, 1);
        lepton.final_parton_level = true;
        assert_eq!(lepton.flags(), 0b0111);
    }
}
