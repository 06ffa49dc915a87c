//! This module is in charge of writing the output table, and of reporting the
//! run summary on the standard output

use crate::{
    driver::RunStats,
    numeric::Float,
    record::Row,
    schema::Schema,
    Result,
};
use eyre::WrapErr;
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Duration,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Name of the output tree
pub const TREE_NAME: &str = "T";

/// Destination of output rows
pub trait RowSink {
    /// Append one row
    fn fill(&mut self, row: &Row<'_>) -> Result<()>;

    /// Flush everything to persistent storage. Called once, at the end of the
    /// run, however many rows were appended.
    fn finish(&mut self) -> Result<()>;
}

/// Table header, written as the first line of the output
#[derive(Serialize)]
struct Header<'a> {
    tree: &'a str,
    schema: &'a str,
    branches: Vec<String>,
}

/// Table writer in JSON-lines format
///
/// The first line describes the table (tree name and branches in leaf-list
/// notation), and every following line is one row.
///
pub struct TableWriter<W: Write> {
    /// Underlying output
    writer: W,

    /// Number of rows written
    rows: u64,
}
//
impl TableWriter<BufWriter<File>> {
    /// Create (or truncate) an output file and write the table header
    pub fn create(path: impl AsRef<Path>, schema: &Schema) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create output file {}", path.display()))?;
        Self::new(BufWriter::new(file), schema)
    }
}
//
impl<W: Write> TableWriter<W> {
    /// Write the table header to `writer`
    pub fn new(mut writer: W, schema: &Schema) -> Result<Self> {
        let header = Header {
            tree: TREE_NAME,
            schema: &schema.name,
            branches: schema.branches(),
        };
        serde_json::to_writer(&mut writer, &header)?;
        writeln!(writer)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Number of rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Get the underlying output back
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for TableWriter<W> {
    fn fill(&mut self, row: &Row<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, row)?;
        writeln!(self.writer)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .wrap_err("Failed to flush the output table")
    }
}

/// Report the outcome of a run
pub fn write_summary(
    out: &mut impl Write,
    schema: &Schema,
    stats: &RunStats,
    elapsed_time: Duration,
) -> Result<()> {
    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the timestamp")?;
    writeln_entry(out, timestamp.as_str())?;
    writeln_entry(out, "---------------------------------------------")?;
    writeln_entry(out, ("Schema", schema.name.as_str()))?;
    writeln_entry(out, ("Requested events", stats.requested))?;
    writeln_entry(out, ("Aborted generations", stats.aborted))?;
    writeln_entry(out, ("Emitted rows", stats.emitted))?;
    writeln_entry(out, ("Rejected by the emission gate", stats.gated))?;
    for (category, tally) in &stats.overflows {
        let key = format!("Overflows of {category}");
        writeln_entry(out, (key.as_str(), tally.occurrences))?;
        let key = format!("... dropped {category}");
        writeln_entry(out, (key.as_str(), tally.dropped))?;
    }
    writeln_entry(out, "---------------------------------------------")?;
    let elapsed_secs = elapsed_time.as_secs_f64() as Float;
    writeln_entry(out, ("Elapsed time (s)", elapsed_secs))?;
    if stats.requested > 0 {
        let secs_per_ev = elapsed_secs / (stats.requested as Float);
        writeln_entry(out, ("Elapsed time per event (s)", secs_per_ev))?;
    }
    Ok(())
}

/// Summary line output, one leading space then the entry
fn writeln_entry(out: &mut impl Write, entry: impl SummaryEntry) -> io::Result<()> {
    write!(out, " ")?;
    entry.write(out)?;
    writeln!(out)
}

/// Things that can be printed in the run summary
trait SummaryEntry: Sized {
    /// Write down `self` using the summary's styling
    fn write(self, out: &mut impl Write) -> io::Result<()>;
}

impl SummaryEntry for &str {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl SummaryEntry for u64 {
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl SummaryEntry for Float {
    // Timings do not deserve more than a few significant digits
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{self:.4e}")
    }
}

impl<T: SummaryEntry> SummaryEntry for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}
