//! Soft drop grooming of surviving jets

use crate::{
    cluster::{Clustering, Jet, SoftDrop},
    numeric::Float,
};

/// Default soft drop angular exponent
pub const DEFAULT_BETA: Float = 0.;

/// Default soft drop energy-fraction cut
pub const DEFAULT_Z_CUT: Float = 0.10;

/// Kinematics of a groomed jet
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Groomed {
    /// Groomed mass
    pub m: Float,
    /// Groomed transverse momentum
    pub pt: Float,
    /// Groomed azimuth
    pub phi: Float,
}

/// Jet groomer with fixed soft drop parameters
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Groomer {
    params: SoftDrop,
}
//
impl Groomer {
    /// Setup a groomer
    pub fn new(params: SoftDrop) -> Self {
        Self { params }
    }

    /// Soft drop parameters in use
    pub fn params(&self) -> &SoftDrop {
        &self.params
    }

    /// Groom one jet. Pure function of the jet.
    pub fn groom(&self, clustering: &impl Clustering, jet: &Jet) -> Groomed {
        let groomed = clustering.soft_drop(jet, &self.params);
        Groomed {
            m: groomed.m(),
            pt: groomed.pt(),
            phi: groomed.phi(),
        }
    }
}

impl Default for Groomer {
    fn default() -> Self {
        Self::new(SoftDrop::new(DEFAULT_BETA, DEFAULT_Z_CUT))
    }
}
