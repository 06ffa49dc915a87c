//! Mechanism for loading the run configuration from the invocation parameters

use crate::{
    error::UsageError,
    evgen::{self, EventGenerator},
    numeric::Float,
    schema::{ExtraArgument, Preset, Schema},
    Result,
};
use itertools::Itertools;
use std::{path::PathBuf, str::FromStr};

/// Number of mandatory positional arguments
const NUM_REQUIRED_ARGS: usize = 4;

/// Seed used when none is given
pub const DEFAULT_SEED: i64 = -1;

/// Run configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Output schema preset
    pub preset: Preset,

    /// Generator configuration file
    pub config_file: PathBuf,

    /// Output table file
    pub output_file: PathBuf,

    /// Number of events to be requested from the generator
    pub num_events: u64,

    /// Leading-jet minimal pt override, for presets that accept one
    pub pt_cut: Option<Float>,

    /// Generator random seed, for presets that accept one
    pub seed: Option<i64>,
}
//
impl Configuration {
    /// Decode the positional invocation parameters (program name excluded)
    pub fn from_args(args: &[String]) -> std::result::Result<Self, UsageError> {
        if args.len() < NUM_REQUIRED_ARGS {
            return Err(UsageError::MissingArguments {
                expected: NUM_REQUIRED_ARGS,
                found: args.len(),
            });
        }

        // Tag every argument with the name of the setting it fills, so that
        // parse errors can say which one is wrong
        let item = |index: usize, name: &'static str| ConfigItem::new(name, &args[index]);

        let preset = args[0].parse::<Preset>()?;
        let mut config = Configuration {
            preset,
            config_file: PathBuf::from(&args[1]),
            output_file: PathBuf::from(&args[2]),
            num_events: item(3, "n_events").parse::<u64>()?,
            pt_cut: None,
            seed: None,
        };
        if let Some(extra) = args.get(NUM_REQUIRED_ARGS) {
            match preset.schema().extra_argument {
                ExtraArgument::PtCut => {
                    config.pt_cut = Some(ConfigItem::new("ptcut", extra).parse::<Float>()?)
                }
                ExtraArgument::Seed => {
                    config.seed = Some(ConfigItem::new("seed", extra).parse::<i64>()?)
                }
            }
        }
        Ok(config)
    }

    /// Output schema, with the pt cut override applied
    pub fn schema(&self) -> Schema {
        let mut schema = self.preset.schema();
        if let Some(pt_cut) = self.pt_cut {
            schema.jet_definition.min_pt = pt_cut;
        }
        schema
    }

    /// Forward the seed settings, then the configuration file's directives,
    /// to the event generator
    pub fn configure(&self, generator: &mut impl EventGenerator) -> Result<()> {
        if self.preset.schema().extra_argument == ExtraArgument::Seed {
            for directive in evgen::seed_directives(self.seed.unwrap_or(DEFAULT_SEED)) {
                generator.read_string(&directive)?;
            }
        }
        for directive in evgen::read_directives(&self.config_file)? {
            generator.read_string(&directive)?;
        }
        Ok(())
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("Schema         : {}", self.preset);
        println!("Config file    : {}", self.config_file.display());
        println!("Output file    : {}", self.output_file.display());
        println!("Events         : {}", self.num_events);
        if let Some(pt_cut) = self.pt_cut {
            println!("Pt cut         : {pt_cut}");
        }
        if self.preset.schema().extra_argument == ExtraArgument::Seed {
            println!("Seed           : {}", self.seed.unwrap_or(DEFAULT_SEED));
        }
    }
}

/// Usage message
pub fn usage(program: &str) -> String {
    let presets = Preset::ALL.iter().join(" | ");
    format!(
        "Usage: {program} <schema> <config_file> <output_file> <n_events> [ptcut | seed]\n\
         \n\
         schema: {presets}\n\
         The optional last argument is a leading-jet pt cut, or the generator seed\n\
         for the mpt schema (default {DEFAULT_SEED})."
    )
}

/// A positional argument, tagged with the setting which it is supposed to
/// fill for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a setting name and raw argument text
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> std::result::Result<T, UsageError> {
        self.data.parse::<T>().map_err(|_| UsageError::BadArgument {
            name: self.name,
            value: self.data.to_owned(),
        })
    }
}
