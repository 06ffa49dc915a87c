//! This module defines the storage of generated events

use crate::{
    momentum::Momentum,
    particle::{Particle, SYSTEM_ID},
};
use std::fmt::Display;

/// Status code of the system entry at native index 0
pub const SYSTEM_STATUS: i32 = -11;

/// Storage for one generated event
///
/// Particles are stored at their native index, so that relational indices
/// and clustering tags can be resolved by direct lookup.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event(Vec<Particle>);
//
impl Event {
    /// Build an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an event whose native index 0 is the "system" entry carrying the
    /// total momentum, so that relation index 0 can mean "none"
    pub fn with_system(total: Momentum) -> Self {
        let mut event = Self::new();
        event.push(Particle::new(SYSTEM_ID, SYSTEM_STATUS, total));
        event
    }

    /// Append a particle, assigning it the next native index
    pub fn push(&mut self, mut particle: Particle) -> usize {
        let index = self.0.len();
        particle.index = index;
        self.0.push(particle);
        index
    }

    /// Look up a particle by native index
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.0.get(index)
    }

    /// Mutable access to a particle by native index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.0.get_mut(index)
    }

    /// Iterate over particles in native index order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.0.iter()
    }

    /// Number of particles, system entry included
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the event holds no particle at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First mother of a particle, if it has one
    pub fn mother(&self, particle: &Particle) -> Option<&Particle> {
        match particle.mothers[0] {
            0 => None,
            index => self.get(index),
        }
    }
}

impl Display for Event {
    /// Dump the event listing, one particle per line
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for p in self.iter() {
            writeln!(
                fmt,
                "  ndx={:6}, id={:6}, status={:6}, p4=({:6.4},{:6.2},{:6.2},{:6.4})",
                p.index,
                p.id,
                p.status,
                p.pt(),
                p.eta(),
                p.phi(),
                p.m
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::momentum;

    #[test]
    fn native_indices_follow_insertion() {
        let mut event = Event::with_system(momentum(0., 0., 0., 100.));
        let first = event.push(Particle::new(23, -22, momentum(0., 0., 0., 91.)));
        let second =
            event.push(Particle::new(11, 1, momentum(10., 0., 0., 10.)).with_mothers(first, 0));
        assert_eq!((first, second), (1, 2));
        assert_eq!(event.get(second).map(|p| p.index), Some(2));
        assert_eq!(event.len(), 3);
    }

    #[test]
    fn mother_zero_means_none() {
        let mut event = Event::with_system(Momentum::zeros());
        let boson = event.push(Particle::new(24, -22, momentum(0., 0., 0., 80.)));
        let lepton = event.push(Particle::new(13, 1, momentum(5., 0., 0., 5.)).with_mothers(boson, 0));
        let orphan = event.push(Particle::new(211, 1, momentum(1., 0., 0., 1.1)));
        let lepton = event.get(lepton).cloned().unwrap();
        let orphan = event.get(orphan).cloned().unwrap();
        assert_eq!(event.mother(&lepton).map(|m| m.id), Some(24));
        assert!(event.mother(&orphan).is_none());
    }
}
