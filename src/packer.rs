//! Projection of one event into one output record
//!
//! This is where the particle classifier, the clustering, the jet filter and
//! groomer, and the index remapper meet. Every capacity limit of the record
//! is enforced here, and every excess is reported as an `Overflow`.

use crate::{
    cluster::{Clustering, Constituent, Jet},
    error::{PipelineError, SchemaError},
    event::Event,
    numeric::{Column, Float},
    overflow::{Overflow, OverflowKind},
    record::{ConstituentLinks, JetEntry, MissingPt, Record},
    remap::IndexRemapper,
    schema::{EmitGate, Schema},
};

/// Event → record projection for one schema
pub struct Packer<C: Clustering> {
    /// Output schema
    schema: Schema,

    /// Clustering back-end
    clustering: C,

    /// Native → compact index map of the current event
    remapper: IndexRemapper,

    /// Clustering inputs of the current event
    inputs: Vec<Constituent>,
}
//
impl<C: Clustering> Packer<C> {
    /// Set up a packer, checking that the schema is consistent
    pub fn new(schema: Schema, clustering: C) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self {
            schema,
            clustering,
            remapper: IndexRemapper::new(),
            inputs: Vec::new(),
        })
    }

    /// Output schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Allocate a record suitable for this packer
    pub fn new_record(&self) -> Record {
        Record::new(&self.schema)
    }

    /// Project `event` into `record`, pushing any capacity overflow into
    /// `overflows`, and tell whether the record should be emitted
    ///
    /// The record is fully reset first. Lookup inconsistencies between jet
    /// constituents and the generator list are fatal.
    ///
    pub fn pack(
        &mut self,
        event_num: u64,
        event: &Event,
        record: &mut Record,
        overflows: &mut Vec<Overflow>,
    ) -> Result<bool, PipelineError> {
        record.reset();
        if let Some(number) = &mut record.event_num {
            *number = event_num;
        }

        tracing::trace!(event = event_num, "event listing\n{event}");
        self.select_particles(event_num, event, record, overflows);

        if let (Some(definition), Some(missing_pt)) =
            (&self.schema.missing_pt, &mut record.missing_pt)
        {
            let pseudo_jets = self.clustering.inclusive_jets(&self.inputs, definition);
            if let Some(leading) = pseudo_jets.first() {
                let groomed = self
                    .schema
                    .groomer
                    .unwrap_or_default()
                    .groom(&self.clustering, leading);
                *missing_pt = MissingPt {
                    pt: leading.pt() as Column,
                    phi: leading.phi() as Column,
                    ptsd: groomed.pt as Column,
                    phisd: groomed.phi as Column,
                };
            }
        }

        let jets = self
            .clustering
            .inclusive_jets(&self.inputs, &self.schema.jet_definition);
        let leading_pt = self.pack_jets(event_num, event, &jets, record, overflows)?;

        let emit = match self.schema.gate {
            EmitGate::Always => true,
            EmitGate::LeadingJetPt => {
                leading_pt.map_or(false, |pt| pt > self.schema.jet_definition.min_pt)
            }
        };
        tracing::debug!(
            event = event_num,
            n_gen = record.gen.len(),
            n_jet = record.jets.len(),
            emit,
            "packed event"
        );
        Ok(emit)
    }

    /// Scan the event once, writing generator-list entries and collecting
    /// clustering inputs
    ///
    /// Once the generator list is full the scan stops, for both lists, and the
    /// remaining particles that belonged in the generator list are reported.
    ///
    fn select_particles(
        &mut self,
        event_num: u64,
        event: &Event,
        record: &mut Record,
        overflows: &mut Vec<Overflow>,
    ) {
        let classifier = &self.schema.classifier;
        self.remapper.clear();
        self.inputs.clear();
        let mut particles = event.iter();
        while let Some(particle) = particles.next() {
            if record.gen.is_full() {
                let dropped = std::iter::once(particle)
                    .chain(particles)
                    .filter(|p| classifier.generator.keep(p))
                    .count();
                if dropped > 0 {
                    overflows.push(Overflow {
                        event: event_num,
                        kind: OverflowKind::GeneratorParticles,
                        dropped,
                    });
                }
                break;
            }
            let selection = classifier.classify(particle, event);
            tracing::trace!(
                index = particle.index,
                id = particle.id,
                status = particle.status,
                ?selection,
                "classified particle"
            );
            if selection.keeps_generator() {
                if let Some(position) = record.gen.push(particle) {
                    self.remapper.insert(particle.index, position);
                }
            }
            if selection.keeps_cluster() {
                self.inputs.push(Constituent {
                    p: particle.p,
                    tag: particle.index,
                });
            }
        }
    }

    /// Filter, groom and write out the jets, returning the transverse momentum
    /// of the leading kept jet
    fn pack_jets(
        &self,
        event_num: u64,
        event: &Event,
        jets: &[Jet],
        record: &mut Record,
        overflows: &mut Vec<Overflow>,
    ) -> Result<Option<Float>, PipelineError> {
        let mut leading_pt = None;
        let mut dropped_jets = 0;
        for jet in jets {
            if let Some(veto) = &self.schema.lepton_veto {
                if !veto.keep(jet, event, event_num)? {
                    tracing::debug!(event = event_num, pt = jet.pt(), "lepton jet vetoed");
                    continue;
                }
            }
            if record.jets.is_full() {
                dropped_jets += 1;
                continue;
            }
            let entry = JetEntry {
                pt: jet.pt(),
                eta: jet.eta(),
                phi: jet.phi(),
                m: jet.m(),
                msd: self
                    .schema
                    .groomer
                    .map(|groomer| groomer.groom(&self.clustering, jet).m),
                nc: jet.constituents.len(),
            };
            let Some(ordinal) = record.jets.push(&entry) else {
                continue;
            };
            leading_pt.get_or_insert(entry.pt);
            self.link_constituents(event_num, ordinal, jet, &mut record.links, overflows)?;
        }
        if dropped_jets > 0 {
            overflows.push(Overflow {
                event: event_num,
                kind: OverflowKind::Jets,
                dropped: dropped_jets,
            });
        }
        Ok(leading_pt)
    }

    /// Record which compact generator-list entries make up a jet
    fn link_constituents(
        &self,
        event_num: u64,
        ordinal: usize,
        jet: &Jet,
        links: &mut ConstituentLinks,
        overflows: &mut Vec<Overflow>,
    ) -> Result<(), PipelineError> {
        let resolve = |constituent: &Constituent| -> Result<i32, PipelineError> {
            let position = self.remapper.resolve(event_num, constituent.tag)?;
            Ok(position as i32)
        };
        match links {
            ConstituentLinks::None => {}
            ConstituentLinks::PerJet { width, ic } => {
                let row = &mut ic[ordinal * *width..(ordinal + 1) * *width];
                for (slot, constituent) in row.iter_mut().zip(&jet.constituents) {
                    *slot = resolve(constituent)?;
                }
                let dropped = jet.constituents.len().saturating_sub(*width);
                if dropped > 0 {
                    overflows.push(Overflow {
                        event: event_num,
                        kind: OverflowKind::ConstituentRow { jet: ordinal },
                        dropped,
                    });
                }
            }
            ConstituentLinks::Flat {
                len,
                particle_ndx,
                jet_ndx,
            } => {
                let count = jet.constituents.len();
                if *len + count > particle_ndx.len() {
                    overflows.push(Overflow {
                        event: event_num,
                        kind: OverflowKind::Constituents { jet: ordinal },
                        dropped: count,
                    });
                    return Ok(());
                }
                for constituent in &jet.constituents {
                    particle_ndx[*len] = resolve(constituent)?;
                    jet_ndx[*len] = ordinal as i32;
                    *len += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cluster::SequentialRecombination,
        momentum::{from_pt_eta_phi_m, Momentum},
        particle::Particle,
        schema::{ConstituentLayout, Preset},
    };

    /// Event with a Z decaying to two muons plus one hadronic spray of
    /// `n_hadrons` pions around (eta, phi) = (0, 2)
    fn z_plus_jet(n_hadrons: usize) -> Event {
        let mut event = Event::with_system(Momentum::zeros());
        let mut z = Particle::new(23, -22, from_pt_eta_phi_m(1., 0., 0., 91.2));
        z.resonance = true;
        let z = event.push(z);
        for (id, phi) in [(13, 0.5), (-13, 5.)] {
            let mut muon =
                Particle::new(id, 1, from_pt_eta_phi_m(45., -1., phi, 0.105)).with_mothers(z, 0);
            muon.final_parton_level = true;
            event.push(muon);
        }
        let total_pt = 300.;
        for i in 0..n_hadrons {
            let offset = 0.01 * i as Float;
            let pion = Particle::new(
                211,
                1,
                from_pt_eta_phi_m(total_pt / n_hadrons as Float, offset, 2. + offset, 0.14),
            );
            event.push(pion);
        }
        event
    }

    fn packer(schema: Schema) -> Packer<SequentialRecombination> {
        Packer::new(schema, SequentialRecombination).unwrap()
    }

    #[test]
    fn jets_preset_links_constituents() {
        let mut packer = packer(Preset::Jets.schema());
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        let event = z_plus_jet(4);
        let emit = packer.pack(0, &event, &mut record, &mut overflows).unwrap();
        assert!(emit);
        assert!(overflows.is_empty());
        // Z, two muons and four pions, system entry left out
        assert_eq!(record.gen.len(), 7);
        assert_eq!(record.gen.id[0], 23);
        assert_eq!(record.gen.mother1[1], 1);
        // Hadronic jet first, muon jets follow
        assert!(record.jets.len() >= 1);
        assert!((record.jets.pt[0] - 300.).abs() < 0.1);
        assert_eq!(record.jets.nc.as_ref().unwrap()[0], 4);
        let ConstituentLinks::PerJet { ic, .. } = &record.links else {
            panic!("jets preset has per-jet rows");
        };
        let mut first_row = ic[..4].to_vec();
        first_row.sort_unstable();
        assert_eq!(first_row, vec![3, 4, 5, 6]);
        assert!(ic[4..50].iter().all(|&i| i == 0));
    }

    #[test]
    fn wide_rows_are_truncated_and_reported() {
        let schema = Schema {
            constituents: ConstituentLayout::PerJet { width: 3 },
            ..Preset::Jets.schema()
        };
        let mut packer = packer(schema);
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        packer
            .pack(5, &z_plus_jet(5), &mut record, &mut overflows)
            .unwrap();
        assert_eq!(record.jets.nc.as_ref().unwrap()[0], 5);
        assert!(overflows.contains(&Overflow {
            event: 5,
            kind: OverflowKind::ConstituentRow { jet: 0 },
            dropped: 2,
        }));
    }

    #[test]
    fn full_generator_list_stops_the_scan() {
        let schema = Schema {
            gen_capacity: 2,
            ..Preset::Jets.schema()
        };
        let mut packer = packer(schema);
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        let emit = packer
            .pack(3, &z_plus_jet(4), &mut record, &mut overflows)
            .unwrap();
        assert_eq!(record.gen.len(), 2);
        assert_eq!(
            overflows,
            vec![Overflow {
                event: 3,
                kind: OverflowKind::GeneratorParticles,
                dropped: 5,
            }]
        );
        // Only the first muon was clustered, and its jet is vetoed
        assert_eq!(record.jets.len(), 0);
        assert!(!emit);
    }

    #[test]
    fn jet_overflow_is_reported() {
        let schema = Schema {
            jet_capacity: 1,
            lepton_veto: None,
            ..Preset::AllParticles.schema()
        };
        let mut packer = packer(schema);
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        packer
            .pack(1, &z_plus_jet(3), &mut record, &mut overflows)
            .unwrap();
        assert_eq!(record.jets.len(), 1);
        assert_eq!(
            overflows,
            vec![Overflow {
                event: 1,
                kind: OverflowKind::Jets,
                dropped: 2,
            }]
        );
    }

    #[test]
    fn missing_pt_preset_keeps_leptons_out_of_jets() {
        let mut packer = packer(Preset::MissingPt.schema());
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        let emit = packer
            .pack(8, &z_plus_jet(4), &mut record, &mut overflows)
            .unwrap();
        assert!(emit);
        assert_eq!(record.event_num, Some(8));
        // Z and muons only: pions are neither resonant nor final at parton level
        assert_eq!(record.gen.len(), 3);
        assert_eq!(record.jets.len(), 1);
        assert!((record.jets.pt[0] - 300.).abs() < 0.1);
        let missing_pt = record.missing_pt.unwrap();
        assert!((missing_pt.pt - 300.).abs() < 0.1);
        assert!((missing_pt.ptsd - 300.).abs() < 0.1);
    }

    #[test]
    fn unlisted_constituent_is_fatal() {
        let mut schema = Preset::Jets.schema();
        schema.classifier.generator = crate::classify::GeneratorSelection::PartonLevel {
            exclude_gluons: false,
        };
        // Bypass validation to exercise the lookup failure
        let mut packer = Packer {
            schema,
            clustering: SequentialRecombination,
            remapper: IndexRemapper::new(),
            inputs: Vec::new(),
        };
        let mut record = packer.new_record();
        let result = packer.pack(2, &z_plus_jet(2), &mut record, &mut Vec::new());
        assert!(matches!(
            result,
            Err(PipelineError::UnmappedConstituent { event: 2, .. })
        ));
    }
}
