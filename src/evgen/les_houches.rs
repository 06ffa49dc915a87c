//! Event generator that replays a Les Houches Event File
//!
//! Parton-level events are read from a (possibly gzipped) LHEF, and turned
//! into events laid out the way a general-purpose generator records them: a
//! system entry at index 0, then one entry per LHEF particle.

use super::EventGenerator;
use crate::{
    event::Event,
    momentum::{momentum, Momentum},
    numeric::Float,
    particle::{Particle, SYSTEM_ID},
    Result,
};
use eyre::{eyre, WrapErr};
use flate2::bufread::GzDecoder;
use itertools::Itertools;
use lhef::{Reader, HEPEUP};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

/// Setting that names the event file
const LHEF_KEY: &str = "beams:lhef";

/// Status of incoming partons
const STATUS_INCOMING: i32 = -21;

/// Status of intermediate resonances
const STATUS_RESONANCE: i32 = -22;

/// Status of outgoing particles of the hard process
const STATUS_OUTGOING: i32 = 23;

/// Replay of a Les Houches Event File
#[derive(Default)]
pub struct LhefGenerator {
    /// Every directive received, in order
    directives: Vec<String>,

    /// Event file, from the `Beams:LHEF` setting
    path: Option<PathBuf>,

    /// Event reader, available after `init`
    reader: Option<Reader<Box<dyn BufRead>>>,

    /// Number of events produced
    produced: u64,

    /// Number of aborted generations
    aborted: u64,
}
//
impl LhefGenerator {
    /// Set up a generator with no configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events produced so far
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Number of generations aborted so far
    pub fn aborted(&self) -> u64 {
        self.aborted
    }

    /// Turn one LHEF event into an event record
    fn convert(hepeup: &HEPEUP) -> Event {
        let count = hepeup.IDUP.len();
        let incoming_total = (0..count)
            .filter(|&i| hepeup.ISTUP[i] == -1)
            .map(|i| lhef_momentum(&hepeup.PUP[i]))
            .sum::<Momentum>();
        let mut event = Event::with_system(incoming_total);
        let mut children = Vec::new();
        for i in 0..count {
            let status = hepeup.ISTUP[i];
            let pup = &hepeup.PUP[i];
            let mother_index = |m: i32| usize::try_from(m).unwrap_or(0);
            let [mother1, mother2] = hepeup.MOTHUP[i];
            let mut particle = Particle::new(hepeup.IDUP[i], generator_status(status), lhef_momentum(pup))
                .with_mothers(mother_index(mother1), mother_index(mother2));
            particle.m = pup[4] as Float;
            particle.tau = hepeup.VTIMUP[i] as Float;
            particle.col = hepeup.ICOLUP[i][0];
            particle.resonance = status == 2;
            particle.final_parton_level = status == 1;
            let index = event.push(particle);
            if mother1 > 0 {
                children.push((mother_index(mother1), index));
            }
        }

        // Daughter ranges go from the first to the last child
        for (mother, child) in children {
            if let Some(mother) = event.get_mut(mother) {
                mother.daughters = match mother.daughters {
                    [0, _] => [child, child],
                    [first, last] => [first.min(child), last.max(child)],
                };
            }
        }
        event
    }
}

impl EventGenerator for LhefGenerator {
    fn read_string(&mut self, directive: &str) -> Result<()> {
        match directive.split_once('=') {
            Some((key, value)) => {
                let key = key
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase();
                if key == LHEF_KEY {
                    self.path = Some(PathBuf::from(value.trim()));
                }
            }
            None => tracing::warn!(directive, "directive is not of the form key = value"),
        }
        self.directives.push(directive.to_owned());
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| eyre!("No event file configured, please set Beams:LHEF"))?;
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open event file {}", path.display()))?;
        let stream: Box<dyn BufRead> = if path.extension().map_or(false, |ext| ext == "gz") {
            Box::new(BufReader::new(GzDecoder::new(BufReader::new(file))))
        } else {
            Box::new(BufReader::new(file))
        };
        let reader = Reader::new(stream)
            .map_err(|err| eyre!("{err}"))
            .wrap_err_with(|| format!("Failed to read the LHEF header of {}", path.display()))?;
        tracing::info!(path = %path.display(), "replaying Les Houches events");
        self.reader = Some(reader);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<Event>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| eyre!("Events were requested before generator initialization"))?;
        match reader.hepeup() {
            Ok(Some(hepeup)) => {
                self.produced += 1;
                Ok(Some(Self::convert(&hepeup)))
            }
            Ok(None) => {
                self.aborted += 1;
                tracing::warn!("event file exhausted");
                Ok(None)
            }
            Err(err) => {
                self.aborted += 1;
                tracing::warn!(error = %err, "failed to read event");
                Ok(None)
            }
        }
    }

    fn stat(&self) {
        tracing::info!(
            produced = self.produced,
            aborted = self.aborted,
            directives = %self.directives.iter().join("; "),
            "Les Houches replay statistics"
        );
    }
}

/// 4-momentum of an LHEF `PUP` entry
fn lhef_momentum(pup: &[f64; 5]) -> Momentum {
    momentum(
        pup[0] as Float,
        pup[1] as Float,
        pup[2] as Float,
        pup[3] as Float,
    )
}

/// Generator status code of an LHEF status code
fn generator_status(lhef_status: i32) -> i32 {
    match lhef_status {
        -1 => STATUS_INCOMING,
        1 => STATUS_OUTGOING,
        2 => STATUS_RESONANCE,
        other if other < 0 => STATUS_INCOMING,
        _ => STATUS_RESONANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};

    const ZJET_LHE: &str = r#"<LesHouchesEvents version="1.0">
<init>
2212 2212 6500 6500 0 0 0 0 3 1
1.0 0.1 1.0 1
</init>
<event>
6 1 1.0 91.2 0.0078 0.118
2 -1 0 0 501 0 0 0 300 300 0 0 9
-2 -1 0 0 0 502 0 0 -100 100 0 0 9
23 2 1 2 0 0 -50 0 150 182.5 91.2 0 9
21 1 1 2 501 502 50 0 50 70.71 0 0 9
13 1 3 3 0 0 -20 30 100 106.3 0.105 0 9
-13 1 3 3 0 0 -30 -30 50 76.3 0.105 0 9
</event>
</LesHouchesEvents>
"#;

    fn generator_for(path: &Path) -> LhefGenerator {
        let mut generator = LhefGenerator::new();
        generator.read_string("Beams:frameType = 4").unwrap();
        generator
            .read_string(&format!(" beams : LHEF = {}", path.display()))
            .unwrap();
        generator.init().unwrap();
        generator
    }

    #[test]
    fn lhef_events_get_generator_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zjet.lhe");
        fs::write(&path, ZJET_LHE).unwrap();
        let mut generator = generator_for(&path);

        let event = generator.next_event().unwrap().unwrap();
        assert_eq!(event.len(), 7);
        let system = event.get(0).unwrap();
        assert_eq!(system.id, SYSTEM_ID);
        assert!((system.p[3] - 400.).abs() < 1e-9);

        let z = event.get(3).unwrap();
        assert_eq!(z.status, STATUS_RESONANCE);
        assert!(z.resonance && !z.is_final());
        assert_eq!(z.mothers, [1, 2]);
        assert_eq!(z.daughters, [5, 6]);
        assert!((z.m - 91.2).abs() < 1e-9);

        let gluon = event.get(4).unwrap();
        assert_eq!(gluon.status, STATUS_OUTGOING);
        assert!(gluon.final_parton_level && gluon.is_final());
        assert_eq!(gluon.col, 501);
        assert_eq!(event.get(1).unwrap().daughters, [3, 4]);

        // The file holds a single event
        assert!(generator.next_event().unwrap().is_none());
        assert_eq!((generator.produced(), generator.aborted()), (1, 1));
    }

    #[test]
    fn missing_event_file_fails_init() {
        let mut generator = LhefGenerator::new();
        assert!(generator.init().is_err());
        generator
            .read_string("Beams:LHEF = /nonexistent/events.lhe")
            .unwrap();
        assert!(generator.init().is_err());
        assert!(generator.next_event().is_err());
    }
}
