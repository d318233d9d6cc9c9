mod analysis;
mod report;

use analysis::run_analysis;
use eulerbeam::AnalysisConfig;
use report::render_summary;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Log level comes from RUST_LOG; `debug` shows every derivation step.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // A JSON configuration path may be given as the only argument. Without it
    // the reference steel pipe with a tip mass is analysed.
    let config = match std::env::args().nth(1) {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };

    // Derive the characteristic equation for the configured ends and solve
    // it numerically for the first few modes.
    let summary = run_analysis(&config)?;

    // Render the plain-text report of roots and frequencies and print it to
    // standard output; log events stay on standard error.
    let report = render_summary(&summary);
    println!("{report}");

    Ok(())
}
