//! Mechanism to reject jets that are reconstructions of isolated leptons

use crate::{
    cluster::Jet,
    error::PipelineError,
    event::Event,
    momentum::{Momentum, E},
    numeric::Float,
};
use num_traits::Zero;

/// Default maximal lepton-energy fraction of a kept jet
pub const DEFAULT_LEPTON_FRACTION: Float = 0.9;

/// Veto on the lepton-energy fraction of jets
///
/// Removes jets made of the leptons of e.g. a Z → ℓℓ decay rather than of
/// hadronic activity.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeptonVeto {
    /// Jets whose lepton fraction is strictly above this are dropped
    pub threshold: Float,
}
//
impl LeptonVeto {
    /// Setup the veto
    pub fn new(threshold: Float) -> Self {
        Self { threshold }
    }

    /// Fraction of the jet energy carried by constituents whose originating
    /// particle has |id| in [11, 15]
    pub fn lepton_fraction(
        &self,
        jet: &Jet,
        event: &Event,
        event_num: u64,
    ) -> Result<Float, PipelineError> {
        let mut lepton_p = Momentum::zero();
        for constituent in &jet.constituents {
            let particle = event
                .get(constituent.tag)
                .ok_or(PipelineError::UnknownParticle {
                    event: event_num,
                    tag: constituent.tag,
                })?;
            if particle.is_lepton_like() {
                tracing::trace!(id = particle.id, pt = particle.pt(), "lepton in jet");
                lepton_p += constituent.p;
            }
        }
        Ok(lepton_p[E] / jet.e())
    }

    /// Decide whether a jet passes the veto or should be rejected
    pub fn keep(&self, jet: &Jet, event: &Event, event_num: u64) -> Result<bool, PipelineError> {
        // A fraction of exactly the threshold is kept
        Ok(!(self.lepton_fraction(jet, event, event_num)? > self.threshold))
    }
}

impl Default for LeptonVeto {
    fn default() -> Self {
        Self::new(DEFAULT_LEPTON_FRACTION)
    }
}
