//! Output schema description
//!
//! A schema says which particles and jets are projected into each row, with
//! which capacities, filters and grooming, and which optional fields the row
//! carries. The five driver behaviours that this program replaces are the
//! five presets below.

use crate::{
    classify::{Classifier, ClusterSelection, GeneratorSelection},
    cluster::{JetAlgorithm, JetDefinition},
    error::{SchemaError, UsageError},
    groom::Groomer,
    jetcut::LeptonVeto,
    numeric::{Column, Float},
};
use std::{fmt, str::FromStr};

/// Fill value of unused array slots
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sentinel {
    /// 0 / 0.0
    Zero,
    /// -1 / -1.0
    MinusOne,
}
//
impl Sentinel {
    /// Integer fill value
    pub fn int(self) -> i32 {
        match self {
            Self::Zero => 0,
            Self::MinusOne => -1,
        }
    }

    /// Floating-point fill value
    pub fn float(self) -> Column {
        self.int() as Column
    }
}

/// How jet → particle links are exposed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstituentLayout {
    /// No constituent information at all
    None,
    /// Constituent count per jet (`jet_nc`)
    Count,
    /// Count plus a fixed-width row of compact particle indices per jet
    /// (`jet_ic[nJet][width]`)
    PerJet {
        /// Row width
        width: usize,
    },
    /// Count plus flat parallel (`particle_ndx`, `jet_ndx`) arrays with a
    /// shared capacity and an `nParticle` count
    Flat {
        /// Capacity of the association arrays
        capacity: usize,
    },
}
//
impl ConstituentLayout {
    /// Does this layout write a per-jet constituent count?
    pub fn has_count(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Does this layout need constituents resolved to compact indices?
    pub fn needs_remap(self) -> bool {
        matches!(self, Self::PerJet { .. } | Self::Flat { .. })
    }
}

/// When a packed record is appended to the output
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EmitGate {
    /// Every successfully generated event gives a row
    Always,
    /// Only events whose leading kept jet has pt strictly above the jet
    /// definition's minimum pt
    LeadingJetPt,
}

/// Meaning of the optional trailing invocation parameter
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExtraArgument {
    /// Jet minimum pt override
    PtCut,
    /// Generator random seed
    Seed,
}

/// Complete description of the projection and of the row layout
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    /// Name, used in diagnostics and in the output header
    pub name: String,

    /// Particle classifier rules
    pub classifier: Classifier,

    /// Capacity of the generator-particle arrays
    pub gen_capacity: usize,

    /// Jet clustering definition
    pub jet_definition: JetDefinition,

    /// Capacity of the jet arrays
    pub jet_capacity: usize,

    /// Lepton-fraction veto, if active
    pub lepton_veto: Option<LeptonVeto>,

    /// Jet grooming, if active (adds `jet_msd`)
    pub groomer: Option<Groomer>,

    /// Jet → particle links
    pub constituents: ConstituentLayout,

    /// Row emission rule
    pub gate: EmitGate,

    /// Fill value of unused slots
    pub sentinel: Sentinel,

    /// Whether rows carry `eventNum`
    pub event_number: bool,

    /// Definition of the pseudo-jet used for the missing-pt summary, if any
    pub missing_pt: Option<JetDefinition>,

    /// Meaning of the optional trailing invocation parameter
    pub extra_argument: ExtraArgument,
}
//
impl Schema {
    /// Check that the schema can be packed consistently
    pub fn validate(&self) -> Result<(), SchemaError> {
        let error = |reason| SchemaError {
            name: self.name.clone(),
            reason,
        };
        if self.constituents.needs_remap() && !self.classifier.cluster_inputs_are_listed() {
            return Err(error(
                "constituent indices need every clustering input in the generator list",
            ));
        }
        if self.jet_capacity == 0 {
            return Err(error("jet capacity must be positive"));
        }
        if let ConstituentLayout::PerJet { width: 0 } | ConstituentLayout::Flat { capacity: 0 } =
            self.constituents
        {
            return Err(error("constituent capacity must be positive"));
        }
        Ok(())
    }

    /// Output branches in leaf-list notation, in row order
    pub fn branches(&self) -> Vec<String> {
        let mut branches = Vec::new();
        if self.event_number {
            branches.push("eventNum/l".to_owned());
        }
        if self.missing_pt.is_some() {
            for name in ["mpt_pt", "mpt_phi", "mpt_ptsd", "mpt_phisd"] {
                branches.push(format!("{name}/F"));
            }
        }
        branches.push("nJet/I".to_owned());
        for name in ["jet_pt", "jet_eta", "jet_phi", "jet_m"] {
            branches.push(format!("{name}[nJet]/F"));
        }
        if self.groomer.is_some() {
            branches.push("jet_msd[nJet]/F".to_owned());
        }
        if self.constituents.has_count() {
            branches.push("jet_nc[nJet]/I".to_owned());
        }
        if let ConstituentLayout::PerJet { width } = self.constituents {
            branches.push(format!("jet_ic[nJet][{width}]/I"));
        }
        branches.push("nGen/I".to_owned());
        for name in ["gen_pt", "gen_eta", "gen_phi", "gen_m"] {
            branches.push(format!("{name}[nGen]/F"));
        }
        for name in [
            "gen_flags",
            "gen_id",
            "gen_status",
            "gen_mother1",
            "gen_mother2",
            "gen_daughter1",
            "gen_daughter2",
            "gen_col",
        ] {
            branches.push(format!("{name}[nGen]/I"));
        }
        for name in ["gen_vxx", "gen_vyy", "gen_vzz", "gen_tau"] {
            branches.push(format!("{name}[nGen]/F"));
        }
        if let ConstituentLayout::Flat { .. } = self.constituents {
            branches.push("nParticle/I".to_owned());
            branches.push("particle_ndx[nParticle]/I".to_owned());
            branches.push("jet_ndx[nParticle]/I".to_owned());
        }
        branches
    }

    /// Display the schema, one setting per line
    pub fn print(&self) {
        let definition = &self.jet_definition;
        println!("Schema         : {}", self.name);
        println!("Jets           : {} R={} ptmin={}", definition.algorithm, definition.radius, definition.min_pt);
        println!("Max jets       : {}", self.jet_capacity);
        println!("Max gen        : {}", self.gen_capacity);
        match self.lepton_veto {
            Some(veto) => println!("Lepton veto    : {}", veto.threshold),
            None => println!("Lepton veto    : off"),
        }
        match self.groomer {
            Some(groomer) => println!(
                "Soft drop      : beta={} z={}",
                groomer.params().beta,
                groomer.params().z_cut
            ),
            None => println!("Soft drop      : off"),
        }
        println!("Constituents   : {:?}", self.constituents);
        println!("Gate           : {:?}", self.gate);
        println!("Sentinel       : {}", self.sentinel.int());
    }
}

/// The five built-in schemas
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Preset {
    /// Wide jets with per-jet constituent index rows
    Jets,
    /// Narrow groomed jets, boson leptons kept out of jets, missing-pt summary
    MissingPt,
    /// A few wide groomed jets with constituent counts
    SoftDrop,
    /// Wide groomed jets with flat jet → particle association arrays
    Constituents,
    /// Every generated particle written out
    AllParticles,
}
//
impl Preset {
    /// All presets, in documentation order
    pub const ALL: [Preset; 5] = [
        Self::Jets,
        Self::MissingPt,
        Self::SoftDrop,
        Self::Constituents,
        Self::AllParticles,
    ];

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Jets => "jets",
            Self::MissingPt => "mpt",
            Self::SoftDrop => "softdrop",
            Self::Constituents => "constituents",
            Self::AllParticles => "allgen",
        }
    }

    /// Build the schema described by this preset
    pub fn schema(self) -> Schema {
        let wide = |min_pt: Float| JetDefinition::anti_kt(0.8, min_pt);
        let narrow = |min_pt: Float| JetDefinition::anti_kt(0.4, min_pt);
        let standard = Classifier {
            generator: GeneratorSelection::Standard { hadrons: true },
            cluster: ClusterSelection::final_state(),
        };
        let base = Schema {
            name: self.name().to_owned(),
            classifier: standard,
            gen_capacity: 10_000,
            jet_definition: wide(30.),
            jet_capacity: 10,
            lepton_veto: Some(LeptonVeto::default()),
            groomer: None,
            constituents: ConstituentLayout::Count,
            gate: EmitGate::LeadingJetPt,
            sentinel: Sentinel::Zero,
            event_number: false,
            missing_pt: None,
            extra_argument: ExtraArgument::PtCut,
        };
        match self {
            Self::Jets => Schema {
                constituents: ConstituentLayout::PerJet { width: 50 },
                ..base
            },
            Self::MissingPt => Schema {
                classifier: Classifier {
                    generator: GeneratorSelection::PartonLevel { exclude_gluons: true },
                    cluster: ClusterSelection {
                        max_abs_eta: Some(5.),
                        remove_boson_daughters: true,
                        exclusive: true,
                    },
                },
                gen_capacity: 5_000,
                jet_definition: narrow(20.),
                lepton_veto: None,
                groomer: Some(Groomer::default()),
                constituents: ConstituentLayout::None,
                gate: EmitGate::Always,
                event_number: true,
                missing_pt: Some(JetDefinition {
                    algorithm: JetAlgorithm::Kt,
                    radius: 1000.,
                    min_pt: 1.,
                }),
                extra_argument: ExtraArgument::Seed,
                ..base
            },
            Self::SoftDrop => Schema {
                classifier: Classifier {
                    generator: GeneratorSelection::Standard { hadrons: false },
                    ..standard
                },
                gen_capacity: 5_000,
                jet_definition: wide(200.),
                jet_capacity: 3,
                groomer: Some(Groomer::default()),
                event_number: true,
                ..base
            },
            Self::Constituents => Schema {
                groomer: Some(Groomer::default()),
                constituents: ConstituentLayout::Flat { capacity: 500 },
                sentinel: Sentinel::MinusOne,
                event_number: true,
                ..base
            },
            Self::AllParticles => Schema {
                classifier: Classifier {
                    generator: GeneratorSelection::All,
                    ..standard
                },
                jet_definition: narrow(20.),
                gate: EmitGate::Always,
                ..base
            },
        }
    }
}

impl FromStr for Preset {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| UsageError::UnknownPreset(s.to_owned()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
