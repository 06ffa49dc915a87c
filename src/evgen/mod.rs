//! Event generation interface
//!
//! The projection pipeline consumes events through the `EventGenerator` trait,
//! which mirrors the life cycle of a general-purpose event generator: it is
//! first configured with textual directives, then initialized, then asked for
//! one event at a time.

mod les_houches;

pub use self::les_houches::LhefGenerator;

use crate::{event::Event, Result};
use eyre::WrapErr;
use std::{fs, path::Path};

/// Source of simulated collision events
pub trait EventGenerator {
    /// Forward one configuration directive, verbatim
    fn read_string(&mut self, directive: &str) -> Result<()>;

    /// Prepare for event generation, once all directives have been read
    fn init(&mut self) -> Result<()>;

    /// Produce the next event
    ///
    /// Returns `Ok(None)` when the generator declines to produce an event
    /// (aborted generation), which is not fatal to the run. Errors are
    /// reserved for conditions that make further generation meaningless.
    ///
    fn next_event(&mut self) -> Result<Option<Event>>;

    /// Report generation statistics at the end of the run
    fn stat(&self) {}
}

/// Extract the directives from the text of a generator configuration file
///
/// Every line is a directive, except for empty lines and lines starting with
/// `!`, which are comments. Directives are not parsed any further.
///
pub fn directives(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| !line.is_empty() && !line.starts_with('!'))
}

/// Read the directives of a generator configuration file
pub fn read_directives(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read generator configuration {}", path.display()))?;
    Ok(directives(&text).map(str::to_owned).collect())
}

/// Directives that make the generator use a given random seed
///
/// Must be forwarded before the configuration file's own directives, so that
/// the file can still override them.
///
pub fn seed_directives(seed: i64) -> [String; 2] {
    [
        "Random:setSeed = on".to_owned(),
        format!("Random:seed = {seed}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "! Z + jets\nBeams:eCM = 13000.\n\n  ! indented is a directive\nWeakBosonAndParton:qqbar2gmZg = on\n";
        let lines = directives(text).collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Beams:eCM = 13000.",
                "  ! indented is a directive",
                "WeakBosonAndParton:qqbar2gmZg = on",
            ]
        );
    }

    #[test]
    fn seed_comes_as_two_directives() {
        assert_eq!(
            seed_directives(-1),
            ["Random:setSeed = on".to_owned(), "Random:seed = -1".to_owned()]
        );
    }

    #[test]
    fn directives_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zjets.cmnd");
        fs::write(&path, "! comment\nMain:numberOfEvents = 10\n").unwrap();
        assert_eq!(
            read_directives(&path).unwrap(),
            vec!["Main:numberOfEvents = 10".to_owned()]
        );
        assert!(read_directives(dir.path().join("missing.cmnd")).is_err());
    }
}
