//! Property-based tests of the record packing rules

use evproj::{
    cluster::{Constituent, Jet, SequentialRecombination},
    event::Event,
    jetcut::LeptonVeto,
    momentum::{from_pt_eta_phi_m, momentum, Momentum},
    numeric::Float,
    overflow::{Overflow, OverflowKind},
    packer::Packer,
    particle::Particle,
    record::ConstituentLinks,
    schema::{ConstituentLayout, Preset, Schema},
};
use proptest::prelude::*;

/// Final-state pions with arbitrary kinematics
fn pions() -> impl Strategy<Value = Vec<(Float, Float, Float)>> {
    prop::collection::vec(
        (1.0 as Float..100., -3.0 as Float..3., 0.0 as Float..6.28),
        0..80,
    )
}

fn event_of(pions: &[(Float, Float, Float)]) -> Event {
    let mut event = Event::with_system(Momentum::zeros());
    for &(pt, eta, phi) in pions {
        event.push(Particle::new(211, 1, from_pt_eta_phi_m(pt, eta, phi, 0.14)));
    }
    event
}

fn small_schema() -> Schema {
    let mut schema = Schema {
        gen_capacity: 20,
        jet_capacity: 3,
        constituents: ConstituentLayout::Flat { capacity: 8 },
        ..Preset::Constituents.schema()
    };
    schema.jet_definition.min_pt = 5.;
    schema
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_counts_stay_within_capacity(pions in pions()) {
        let mut packer = Packer::new(small_schema(), SequentialRecombination::new()).unwrap();
        let mut record = packer.new_record();
        let mut overflows = Vec::new();
        packer.pack(0, &event_of(&pions), &mut record, &mut overflows).unwrap();

        prop_assert!(record.gen.len() <= 20);
        prop_assert!(record.jets.len() <= 3);
        if let ConstituentLinks::Flat { len, .. } = record.links {
            prop_assert!(len <= 8);
        }

        // Generator-list truncation is reported with the exact excess
        let truncation = overflows
            .iter()
            .find(|o| o.kind == OverflowKind::GeneratorParticles)
            .copied();
        if pions.len() > 20 {
            prop_assert_eq!(record.gen.len(), 20);
            prop_assert_eq!(truncation, Some(Overflow {
                event: 0,
                kind: OverflowKind::GeneratorParticles,
                dropped: pions.len() - 20,
            }));
        } else {
            prop_assert_eq!(record.gen.len(), pions.len());
            prop_assert_eq!(truncation, None);
        }
    }

    #[test]
    fn prop_jets_are_pt_ordered(pions in pions()) {
        let mut packer = Packer::new(small_schema(), SequentialRecombination::new()).unwrap();
        let mut record = packer.new_record();
        packer.pack(0, &event_of(&pions), &mut record, &mut Vec::new()).unwrap();
        let pts = &record.jets.pt[..record.jets.len()];
        prop_assert!(pts.windows(2).all(|pair| pair[0] >= pair[1]));
        prop_assert!(pts.iter().all(|&pt| pt >= 5.));
    }

    #[test]
    fn prop_veto_keeps_up_to_threshold(lepton in 0.0 as Float..500., hadron in 0.0 as Float..500.) {
        prop_assume!(lepton + hadron > 0.);
        let mut event = Event::with_system(Momentum::zeros());
        let mut constituents = Vec::new();
        for (id, energy) in [(13, lepton), (211, hadron)] {
            let p = momentum(energy, 0., 0., energy);
            let tag = event.push(Particle::new(id, 1, p));
            constituents.push(Constituent { p, tag });
        }
        let jet = Jet {
            p: constituents[0].p + constituents[1].p,
            constituents,
        };
        let kept = LeptonVeto::default().keep(&jet, &event, 0).unwrap();
        prop_assert_eq!(kept, lepton / (lepton + hadron) <= 0.9);
    }

    #[test]
    fn prop_flags_fit_in_four_bits(id in -400i32..400, status in -100i32..100, fpl in any::<bool>()) {
        let mut particle = Particle::new(id, status, Momentum::zeros());
        particle.final_parton_level = fpl;
        let flags = particle.flags();
        prop_assert!((0..16).contains(&flags));
        prop_assert_eq!(flags & 0b0100 != 0, status > 0);
        prop_assert_eq!(flags & 0b0010 != 0, fpl);
    }
}

#[test]
fn flag_extremes() {
    let mut pion = Particle::new(211, 1, Momentum::zeros());
    pion.final_parton_level = true;
    assert_eq!(pion.flags(), 0b1111);
    let neutrino = Particle::new(12, -21, Momentum::zeros());
    assert_eq!(neutrino.flags(), 0);
}
