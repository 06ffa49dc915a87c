//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::{reals::consts::PI, Float};
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Rapidity magnitude reported for momenta lying exactly along the beam
pub const MAX_RAP: Float = 1e5;

/// Smallest transverse momentum used when computing pseudorapidities
const TINY: Float = 1e-20;

/// Build a 4-momentum from its cartesian components
pub fn momentum(px: Float, py: Float, pz: Float, e: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Build a 4-momentum from transverse momentum, pseudorapidity, azimuth and
/// mass
pub fn from_pt_eta_phi_m(pt: Float, eta: Float, phi: Float, m: Float) -> Momentum {
    let (px, py, pz) = (pt * phi.cos(), pt * phi.sin(), pt * eta.sinh());
    let e = sqrt(px * px + py * py + pz * pz + m * m);
    Momentum::new(px, py, pz, e)
}

/// Squared transverse momentum
pub fn pt2(p: &Momentum) -> Float {
    p[X] * p[X] + p[Y] * p[Y]
}

/// Transverse momentum
pub fn pt(p: &Momentum) -> Float {
    sqrt(pt2(p))
}

/// Norm of the spatial part
pub fn p_abs(p: &Momentum) -> Float {
    sqrt(pt2(p) + p[Z] * p[Z])
}

/// Squared invariant mass, negative for space-like vectors
pub fn m2(p: &Momentum) -> Float {
    p[E] * p[E] - pt2(p) - p[Z] * p[Z]
}

/// Invariant mass
///
/// Space-like vectors get a negative mass `-sqrt(-m²)` rather than NaN, which
/// is what clustering libraries report for slightly off-shell sums.
///
pub fn m(p: &Momentum) -> Float {
    let m2 = m2(p);
    if m2 < 0. {
        -sqrt(-m2)
    } else {
        sqrt(m2)
    }
}

/// Azimuthal angle in (-π, π], the generator's convention
pub fn phi_signed(p: &Momentum) -> Float {
    if p[X] == 0. && p[Y] == 0. {
        0.
    } else {
        p[Y].atan2(p[X])
    }
}

/// Azimuthal angle in [0, 2π), the clustering library's convention
pub fn phi(p: &Momentum) -> Float {
    let phi = phi_signed(p);
    if phi < 0. {
        phi + 2. * PI
    } else {
        phi
    }
}

/// Pseudorapidity
pub fn eta(p: &Momentum) -> Float {
    let eta = ln((p_abs(p) + abs(p[Z])) / pt(p).max(TINY));
    if p[Z] > 0. {
        eta
    } else {
        -eta
    }
}

/// Rapidity, clamped to ±MAX_RAP for momenta along the beam axis
pub fn rap(p: &Momentum) -> Float {
    let (plus, minus) = (p[E] + p[Z], p[E] - p[Z]);
    if plus <= 0. || minus <= 0. || (pt2(p) == 0. && p[E] == abs(p[Z])) {
        // Massless (or unphysical) momentum along the beam
        if p[Z] >= 0. {
            MAX_RAP + abs(p[Z])
        } else {
            -(MAX_RAP + abs(p[Z]))
        }
    } else {
        0.5 * ln(plus / minus)
    }
}

/// Azimuthal distance between two angles, folded into [0, π]
pub fn delta_phi(phi1: Float, phi2: Float) -> Float {
    let dphi = abs(phi1 - phi2);
    if dphi > PI {
        2. * PI - dphi
    } else {
        dphi
    }
}

/// Squared distance in the (rapidity, azimuth) plane
pub fn delta_r2(p1: &Momentum, p2: &Momentum) -> Float {
    let drap = rap(p1) - rap(p2);
    let dphi = delta_phi(phi(p1), phi(p2));
    drap * drap + dphi * dphi
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Float, b: Float) -> bool {
        abs(a - b) < 1e-4
    }

    #[test]
    fn transverse_kinematics() {
        let p = momentum(3., 4., 0., 13.);
        assert!(close(pt(&p), 5.));
        assert!(close(m(&p), 12.));
        assert!(close(eta(&p), 0.));
        assert!(close(rap(&p), 0.));
    }

    #[test]
    fn polar_construction_roundtrips() {
        let p = from_pt_eta_phi_m(50., -1.2, 2.5, 10.);
        assert!(close(pt(&p), 50.));
        assert!(close(eta(&p), -1.2));
        assert!(close(phi(&p), 2.5));
        assert!(close(m(&p), 10.));
    }

    #[test]
    fn azimuth_conventions() {
        let p = momentum(0., -1., 0., 1.);
        assert!(close(phi_signed(&p), -PI / 2.));
        assert!(close(phi(&p), 3. * PI / 2.));
        assert_eq!(phi(&Momentum::zeros()), 0.);
    }

    #[test]
    fn spacelike_mass_is_negative() {
        let p = momentum(2., 0., 0., 1.);
        assert!(m(&p) < 0.);
        assert!(close(m(&p), -sqrt(3.)));
    }

    #[test]
    fn beam_axis_rapidity_is_clamped() {
        let p = momentum(0., 0., 10., 10.);
        assert!(rap(&p) > MAX_RAP);
        let p = momentum(0., 0., -10., 10.);
        assert!(rap(&p) < -MAX_RAP);
        assert!(eta(&p) < -10.);
    }

    #[test]
    fn azimuthal_distance_wraps() {
        assert!(close(delta_phi(0.1, 2. * PI - 0.1), 0.2));
        let a = momentum(1., 0.01, 0., 1.1);
        let b = momentum(1., -0.01, 0., 1.1);
        assert!(delta_r2(&a, &b) < 1e-3);
    }
}
