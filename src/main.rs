//! Command-line entry point of evproj

use evproj::{
    config::{self, Configuration},
    output, Result,
};
use eyre::WrapErr;
use std::{io, time::Instant};
use tracing_subscriber::EnvFilter;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // Diagnostics go to stderr, so that they do not mix with the run echo
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    // ### CONFIGURATION READOUT ###

    let args = std::env::args().collect::<Vec<_>>();
    let program = args.first().map_or("evproj", String::as_str);
    let cfg = match Configuration::from_args(args.get(1..).unwrap_or_default()) {
        Ok(cfg) => cfg,
        Err(err) => {
            // A malformed invocation is not a failure: explain and leave
            println!("{err}");
            println!("{}", config::usage(program));
            return Ok(());
        }
    };
    cfg.print();

    // ### EVENT LOOP ###

    // NOTE: The clock starts after configuration readout, to avoid
    //       IO-induced timing fluctuations
    let saved_time = Instant::now();
    let stats = evproj::run(&cfg).wrap_err("Failed to project the events")?;
    let elapsed_time = saved_time.elapsed();

    // ### RUN SUMMARY ###

    output::write_summary(&mut io::stdout().lock(), &cfg.schema(), &stats, elapsed_time)
        .wrap_err("Failed to output the run summary")?;
    Ok(())
}

