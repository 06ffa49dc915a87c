//! Per-event output record
//!
//! The record is a set of fixed-capacity parallel arrays (one per output
//! column) plus their counts. It is allocated once for a run, and fully reset
//! to the schema's sentinel at the top of every event, so that no value from
//! a previous event survives in unused slots.

use crate::{
    numeric::{Column, Float},
    particle::Particle,
    schema::{ConstituentLayout, Schema, Sentinel},
};
use serde::Serialize;

/// Missing transverse momentum summary
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct MissingPt {
    /// Transverse momentum of the leading pseudo-jet
    #[serde(rename = "mpt_pt")]
    pub pt: Column,
    /// Azimuth of the leading pseudo-jet
    #[serde(rename = "mpt_phi")]
    pub phi: Column,
    /// Transverse momentum of the groomed leading pseudo-jet
    #[serde(rename = "mpt_ptsd")]
    pub ptsd: Column,
    /// Azimuth of the groomed leading pseudo-jet
    #[serde(rename = "mpt_phisd")]
    pub phisd: Column,
}

/// Generator-particle arrays, in compact numbering
#[derive(Clone, Debug, PartialEq)]
pub struct GenParticles {
    len: usize,
    capacity: usize,
    /// Transverse momentum
    pub pt: Vec<Column>,
    /// Pseudorapidity
    pub eta: Vec<Column>,
    /// Azimuth in (-π, π]
    pub phi: Vec<Column>,
    /// Generator mass
    pub m: Vec<Column>,
    /// Particle identity code
    pub id: Vec<i32>,
    /// Packed {hadron, final, final at parton level, visible} flags
    pub flags: Vec<i32>,
    /// Generator status code
    pub status: Vec<i32>,
    /// First mother, native numbering
    pub mother1: Vec<i32>,
    /// Second mother, native numbering
    pub mother2: Vec<i32>,
    /// First daughter, native numbering
    pub daughter1: Vec<i32>,
    /// Last daughter, native numbering
    pub daughter2: Vec<i32>,
    /// Color line
    pub col: Vec<i32>,
    /// Production vertex x
    pub vxx: Vec<Column>,
    /// Production vertex y
    pub vyy: Vec<Column>,
    /// Production vertex z
    pub vzz: Vec<Column>,
    /// Proper lifetime
    pub tau: Vec<Column>,
}
//
impl GenParticles {
    /// Allocate arrays of a given capacity, filled with the sentinel
    pub fn new(capacity: usize, sentinel: Sentinel) -> Self {
        let float = vec![sentinel.float(); capacity];
        let int = vec![sentinel.int(); capacity];
        Self {
            len: 0,
            capacity,
            pt: float.clone(),
            eta: float.clone(),
            phi: float.clone(),
            m: float.clone(),
            id: int.clone(),
            flags: int.clone(),
            status: int.clone(),
            mother1: int.clone(),
            mother2: int.clone(),
            daughter1: int.clone(),
            daughter2: int.clone(),
            col: int,
            vxx: float.clone(),
            vyy: float.clone(),
            vzz: float.clone(),
            tau: float,
        }
    }

    /// Number of entries written so far (`nGen`)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Truth that nothing was written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximal number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Truth that no further entry can be written
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Copy a particle into the next slot and return its compact position,
    /// or return None if the arrays are full
    pub fn push(&mut self, particle: &Particle) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let i = self.len;
        let native = |index: usize| index as i32;
        self.pt[i] = particle.pt() as Column;
        self.eta[i] = particle.eta() as Column;
        self.phi[i] = particle.phi() as Column;
        self.m[i] = particle.m as Column;
        self.id[i] = particle.id;
        self.flags[i] = particle.flags();
        self.status[i] = particle.status;
        self.mother1[i] = native(particle.mothers[0]);
        self.mother2[i] = native(particle.mothers[1]);
        self.daughter1[i] = native(particle.daughters[0]);
        self.daughter2[i] = native(particle.daughters[1]);
        self.col[i] = particle.col;
        self.vxx[i] = particle.vertex.x as Column;
        self.vyy[i] = particle.vertex.y as Column;
        self.vzz[i] = particle.vertex.z as Column;
        self.tau[i] = particle.tau as Column;
        self.len += 1;
        Some(i)
    }

    fn reset(&mut self, sentinel: Sentinel) {
        self.len = 0;
        for column in [
            &mut self.pt,
            &mut self.eta,
            &mut self.phi,
            &mut self.m,
            &mut self.vxx,
            &mut self.vyy,
            &mut self.vzz,
            &mut self.tau,
        ] {
            column.fill(sentinel.float());
        }
        for column in [
            &mut self.id,
            &mut self.flags,
            &mut self.status,
            &mut self.mother1,
            &mut self.mother2,
            &mut self.daughter1,
            &mut self.daughter2,
            &mut self.col,
        ] {
            column.fill(sentinel.int());
        }
    }
}

/// Kinematics of one output jet
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct JetEntry {
    /// Transverse momentum
    pub pt: Float,
    /// Pseudorapidity
    pub eta: Float,
    /// Azimuth in [0, 2π)
    pub phi: Float,
    /// Mass
    pub m: Float,
    /// Groomed mass, if the schema grooms jets
    pub msd: Option<Float>,
    /// Number of constituents
    pub nc: usize,
}

/// Jet arrays
#[derive(Clone, Debug, PartialEq)]
pub struct Jets {
    len: usize,
    capacity: usize,
    /// Transverse momentum, decreasing
    pub pt: Vec<Column>,
    /// Pseudorapidity
    pub eta: Vec<Column>,
    /// Azimuth in [0, 2π)
    pub phi: Vec<Column>,
    /// Mass
    pub m: Vec<Column>,
    /// Groomed mass, for grooming schemas
    pub msd: Option<Vec<Column>>,
    /// Constituent count, for schemas that expose constituents
    pub nc: Option<Vec<i32>>,
}
//
impl Jets {
    /// Allocate arrays of a given capacity, filled with the sentinel
    pub fn new(capacity: usize, sentinel: Sentinel, groomed: bool, counted: bool) -> Self {
        let float = vec![sentinel.float(); capacity];
        Self {
            len: 0,
            capacity,
            pt: float.clone(),
            eta: float.clone(),
            phi: float.clone(),
            msd: groomed.then(|| float.clone()),
            m: float,
            nc: counted.then(|| vec![sentinel.int(); capacity]),
        }
    }

    /// Number of jets written so far (`nJet`)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Truth that no jet was written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Truth that no further jet can be written
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Write the next jet and return its ordinal, or None if full
    pub fn push(&mut self, jet: &JetEntry) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let i = self.len;
        self.pt[i] = jet.pt as Column;
        self.eta[i] = jet.eta as Column;
        self.phi[i] = jet.phi as Column;
        self.m[i] = jet.m as Column;
        if let (Some(msd), Some(value)) = (&mut self.msd, jet.msd) {
            msd[i] = value as Column;
        }
        if let Some(nc) = &mut self.nc {
            nc[i] = jet.nc as i32;
        }
        self.len += 1;
        Some(i)
    }

    fn reset(&mut self, sentinel: Sentinel) {
        self.len = 0;
        let columns = [&mut self.pt, &mut self.eta, &mut self.phi, &mut self.m];
        for column in columns.into_iter().chain(self.msd.as_mut()) {
            column.fill(sentinel.float());
        }
        if let Some(nc) = &mut self.nc {
            nc.fill(sentinel.int());
        }
    }
}

/// Jet → particle links, in compact particle numbering
#[derive(Clone, Debug, PartialEq)]
pub enum ConstituentLinks {
    /// No links stored
    None,
    /// One fixed-width row per jet slot
    PerJet {
        /// Row width
        width: usize,
        /// Row-major `[jet capacity][width]` array
        ic: Vec<i32>,
    },
    /// Flat parallel association arrays
    Flat {
        /// Number of associations written (`nParticle`)
        len: usize,
        /// Compact particle index of each association
        particle_ndx: Vec<i32>,
        /// Jet ordinal of each association
        jet_ndx: Vec<i32>,
    },
}
//
impl ConstituentLinks {
    fn new(layout: ConstituentLayout, jet_capacity: usize, sentinel: Sentinel) -> Self {
        match layout {
            ConstituentLayout::None | ConstituentLayout::Count => Self::None,
            ConstituentLayout::PerJet { width } => Self::PerJet {
                width,
                ic: vec![sentinel.int(); jet_capacity * width],
            },
            ConstituentLayout::Flat { capacity } => Self::Flat {
                len: 0,
                particle_ndx: vec![sentinel.int(); capacity],
                jet_ndx: vec![sentinel.int(); capacity],
            },
        }
    }

    fn reset(&mut self, sentinel: Sentinel) {
        match self {
            Self::None => {}
            Self::PerJet { ic, .. } => ic.fill(sentinel.int()),
            Self::Flat {
                len,
                particle_ndx,
                jet_ndx,
            } => {
                *len = 0;
                particle_ndx.fill(sentinel.int());
                jet_ndx.fill(sentinel.int());
            }
        }
    }
}

/// One output row, before serialization
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    sentinel: Sentinel,
    /// Event sequence number, for schemas that carry it
    pub event_num: Option<u64>,
    /// Missing transverse momentum summary, for schemas that carry it
    pub missing_pt: Option<MissingPt>,
    /// Jet arrays
    pub jets: Jets,
    /// Generator-particle arrays
    pub gen: GenParticles,
    /// Jet → particle links
    pub links: ConstituentLinks,
}
//
impl Record {
    /// Allocate a record for a given schema
    pub fn new(schema: &Schema) -> Self {
        let sentinel = schema.sentinel;
        Self {
            sentinel,
            event_num: schema.event_number.then_some(0),
            missing_pt: schema.missing_pt.map(|_| MissingPt::default()),
            jets: Jets::new(
                schema.jet_capacity,
                sentinel,
                schema.groomer.is_some(),
                schema.constituents.has_count(),
            ),
            gen: GenParticles::new(schema.gen_capacity, sentinel),
            links: ConstituentLinks::new(schema.constituents, schema.jet_capacity, sentinel),
        }
    }

    /// Fill value of unused slots
    pub fn sentinel(&self) -> Sentinel {
        self.sentinel
    }

    /// Bring every array and count back to its initial state
    pub fn reset(&mut self) {
        let sentinel = self.sentinel;
        if let Some(event_num) = &mut self.event_num {
            *event_num = 0;
        }
        if let Some(missing_pt) = &mut self.missing_pt {
            *missing_pt = MissingPt::default();
        }
        self.jets.reset(sentinel);
        self.gen.reset(sentinel);
        self.links.reset(sentinel);
    }

    /// View of the used part of the record, ready for serialization
    pub fn row(&self) -> Row<'_> {
        let n_jet = self.jets.len;
        let n_gen = self.gen.len;
        let gen = &self.gen;
        let (jet_ic, n_particle, particle_ndx, jet_ndx) = match &self.links {
            ConstituentLinks::None => (None, None, None, None),
            ConstituentLinks::PerJet { width, ic } => {
                let rows = ic.chunks(*width).take(n_jet).collect();
                (Some(rows), None, None, None)
            }
            ConstituentLinks::Flat {
                len,
                particle_ndx,
                jet_ndx,
            } => (
                None,
                Some(*len as i32),
                Some(&particle_ndx[..*len]),
                Some(&jet_ndx[..*len]),
            ),
        };
        Row {
            event_num: self.event_num,
            missing_pt: self.missing_pt,
            n_jet: n_jet as i32,
            jet_pt: &self.jets.pt[..n_jet],
            jet_eta: &self.jets.eta[..n_jet],
            jet_phi: &self.jets.phi[..n_jet],
            jet_m: &self.jets.m[..n_jet],
            jet_msd: self.jets.msd.as_deref().map(|msd| &msd[..n_jet]),
            jet_nc: self.jets.nc.as_deref().map(|nc| &nc[..n_jet]),
            jet_ic,
            n_gen: n_gen as i32,
            gen_pt: &gen.pt[..n_gen],
            gen_eta: &gen.eta[..n_gen],
            gen_phi: &gen.phi[..n_gen],
            gen_m: &gen.m[..n_gen],
            gen_flags: &gen.flags[..n_gen],
            gen_id: &gen.id[..n_gen],
            gen_status: &gen.status[..n_gen],
            gen_mother1: &gen.mother1[..n_gen],
            gen_mother2: &gen.mother2[..n_gen],
            gen_daughter1: &gen.daughter1[..n_gen],
            gen_daughter2: &gen.daughter2[..n_gen],
            gen_col: &gen.col[..n_gen],
            gen_vxx: &gen.vxx[..n_gen],
            gen_vyy: &gen.vyy[..n_gen],
            gen_vzz: &gen.vzz[..n_gen],
            gen_tau: &gen.tau[..n_gen],
            n_particle,
            particle_ndx,
            jet_ndx,
        }
    }
}

/// Borrowed view of the used part of a record
///
/// Variable-length arrays are cut to their count, and fields that the schema
/// does not carry are left out of the serialized form. Field order is the
/// branch order of `Schema::branches`, and field names are branch names.
///
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row<'a> {
    #[serde(rename = "eventNum", skip_serializing_if = "Option::is_none")]
    pub event_num: Option<u64>,
    #[serde(flatten)]
    pub missing_pt: Option<MissingPt>,
    #[serde(rename = "nJet")]
    pub n_jet: i32,
    pub jet_pt: &'a [Column],
    pub jet_eta: &'a [Column],
    pub jet_phi: &'a [Column],
    pub jet_m: &'a [Column],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jet_msd: Option<&'a [Column]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jet_nc: Option<&'a [i32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jet_ic: Option<Vec<&'a [i32]>>,
    #[serde(rename = "nGen")]
    pub n_gen: i32,
    pub gen_pt: &'a [Column],
    pub gen_eta: &'a [Column],
    pub gen_phi: &'a [Column],
    pub gen_m: &'a [Column],
    pub gen_flags: &'a [i32],
    pub gen_id: &'a [i32],
    pub gen_status: &'a [i32],
    pub gen_mother1: &'a [i32],
    pub gen_mother2: &'a [i32],
    pub gen_daughter1: &'a [i32],
    pub gen_daughter2: &'a [i32],
    pub gen_col: &'a [i32],
    pub gen_vxx: &'a [Column],
    pub gen_vyy: &'a [Column],
    pub gen_vzz: &'a [Column],
    pub gen_tau: &'a [Column],
    #[serde(rename = "nParticle", skip_serializing_if = "Option::is_none")]
    pub n_particle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_ndx: Option<&'a [i32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jet_ndx: Option<&'a [i32]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{momentum::from_pt_eta_phi_m, schema::Preset};

    fn pion() -> Particle {
        let mut pion = Particle::new(211, 1, from_pt_eta_phi_m(12., 0.3, -1., 0.14))
            .with_mothers(4, 0)
            .with_daughters(0, 0);
        pion.index = 9;
        pion
    }

    #[test]
    fn gen_list_stops_at_capacity() {
        let mut gen = GenParticles::new(2, Sentinel::Zero);
        assert_eq!(gen.push(&pion()), Some(0));
        assert_eq!(gen.push(&pion()), Some(1));
        assert!(gen.is_full());
        assert_eq!(gen.push(&pion()), None);
        assert_eq!(gen.len(), 2);
        assert_eq!(gen.mother1[1], 4);
        assert_eq!(gen.flags[0], pion().flags());
    }

    #[test]
    fn reset_clears_every_slot() {
        let schema = Preset::Constituents.schema();
        let mut record = Record::new(&schema);
        let fresh = record.clone();
        record.gen.push(&pion());
        record.jets.push(&JetEntry {
            pt: 50.,
            msd: Some(10.),
            nc: 4,
            ..JetEntry::default()
        });
        if let ConstituentLinks::Flat {
            len,
            particle_ndx,
            jet_ndx,
        } = &mut record.links
        {
            *len = 1;
            particle_ndx[0] = 0;
            jet_ndx[0] = 0;
        }
        record.event_num = Some(17);
        assert_ne!(record, fresh);
        record.reset();
        assert_eq!(record, fresh);
        assert_eq!(record.gen.pt[0], -1.);
        assert_eq!(record.jets.nc.as_ref().unwrap()[0], -1);
    }

    #[test]
    fn row_only_exposes_used_slots() {
        let schema = Preset::Jets.schema();
        let mut record = Record::new(&schema);
        record.gen.push(&pion());
        record.jets.push(&JetEntry {
            pt: 120.,
            nc: 1,
            ..JetEntry::default()
        });
        if let ConstituentLinks::PerJet { ic, .. } = &mut record.links {
            ic[0] = 0;
        }
        let row = record.row();
        assert_eq!(row.n_jet, 1);
        assert_eq!(row.jet_pt, &[120.]);
        assert_eq!(row.jet_ic.as_ref().map(|rows| rows[0].len()), Some(50));
        assert_eq!(row.gen_id, &[211]);
        assert_eq!(row.event_num, None);
        assert_eq!(row.jet_msd, None);

        let json = serde_json::to_value(&row).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("eventNum"));
        assert!(!object.contains_key("mpt_pt"));
        assert_eq!(object["nGen"], 1);
    }

    #[test]
    fn missing_pt_fields_are_flattened() {
        let mut record = Record::new(&Preset::MissingPt.schema());
        record.missing_pt = Some(MissingPt {
            pt: 3.,
            phi: 1.,
            ptsd: 2.,
            phisd: 1.,
        });
        let json = serde_json::to_value(&record.row()).unwrap();
        assert_eq!(json["mpt_ptsd"], 2.);
        assert_eq!(json["eventNum"], 0);
    }
}
