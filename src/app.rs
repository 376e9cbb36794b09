use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info};

use crate::render::{output_filename, render_dashboard};
use crate::state::Session;

// ---------------------------------------------------------------------------
// One invocation: load → select → build → render → write
// ---------------------------------------------------------------------------

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    /// Name or ordinal; prompted for on stdin when absent.
    pub location: Option<String>,
    pub out_dir: PathBuf,
    /// Only print the location list.
    pub list: bool,
}

/// How the run ended.  None of these is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed,
    Written(PathBuf),
    NotFound(String),
}

/// Run the dashboard pipeline.  User-facing text goes to `out`; answers to
/// the location prompt are read from `input`.
pub fn run(opts: &Options, mut input: impl BufRead, mut out: impl Write) -> Result<Outcome> {
    let session = Session::load(&opts.input)?;

    if opts.list {
        writeln!(out, "Available locations:")?;
        write!(out, "{}", session.location_listing())?;
        return Ok(Outcome::Listed);
    }

    let answer = match &opts.location {
        Some(loc) => loc.clone(),
        None => {
            writeln!(out, "Available locations:")?;
            write!(out, "{}", session.location_listing())?;
            write!(out, "\nPlease select a location from the list above: ")?;
            out.flush()?;
            let mut line = String::new();
            input.read_line(&mut line).context("reading location from stdin")?;
            line
        }
    };

    let location = session.resolve(&answer);
    debug!("selection {:?} resolved to {:?}", answer.trim(), location);

    let Some(report) = session.report_for(&location) else {
        writeln!(
            out,
            "No data found for '{location}'. Please check the spelling or choose another location."
        )?;
        writeln!(out, "Available locations:")?;
        write!(out, "{}", session.location_listing())?;
        return Ok(Outcome::NotFound(location));
    };
    info!(
        "{location}: {} series over {}-{}",
        report.series.len(),
        report.summary.earliest_year,
        report.summary.latest_year
    );

    let html = render_dashboard(&report, Local::now().date_naive())?;
    let path = opts.out_dir.join(output_filename(&location));
    std::fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;

    writeln!(out, "\nDashboard saved as '{}'", path.display())?;
    writeln!(
        out,
        "Open this file in your web browser to view the interactive dashboard for {location}."
    )?;
    Ok(Outcome::Written(path))
}
