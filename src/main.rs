use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ValueHint};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod extremum_detection;
mod flight_loader;
mod profile_chart;
mod profile_extractor;
mod report_writer;
mod sample_series;
mod wind_summary;

use extremum_detection::ExtremumConfig;
use profile_extractor::{DurationFilter, ExtractionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract ascent/descent profiles from flight sensor data", long_about = None)]
struct Cli {
    /// Input flight data (.mat export or .csv/.tsv table)
    #[arg(long, value_hint = ValueHint::FilePath)]
    ifile: PathBuf,

    /// Output path base without extension; writes <base>.txt and <base>_cart.svg
    #[arg(long, value_hint = ValueHint::FilePath)]
    obase: PathBuf,

    /// Minimum peak altitude (m)
    #[arg(long, default_value_t = 800.0)]
    peak_height: f64,

    /// Maximum valley altitude (m)
    #[arg(long, default_value_t = 100.0)]
    valley_height: f64,

    /// Minimum prominence of peaks and valleys (m)
    #[arg(long, default_value_t = 50.0)]
    prominence: f64,

    /// Which ascent/descent legs are kept
    #[arg(long, value_enum, default_value_t = DurationFilterArg::BelowMean)]
    duration_filter: DurationFilterArg,

    /// Skip chart rendering
    #[arg(long)]
    no_plot: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DurationFilterArg {
    /// Keep legs shorter than the mean leg
    BelowMean,
    /// Keep every alternating leg
    KeepAll,
}

impl From<DurationFilterArg> for DurationFilter {
    fn from(arg: DurationFilterArg) -> Self {
        match arg {
            DurationFilterArg::BelowMean => DurationFilter::BelowMeanSpan,
            DurationFilterArg::KeepAll => DurationFilter::KeepAll,
        }
    }
}

impl Cli {
    fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            extremum: ExtremumConfig {
                peak_height_threshold: self.peak_height,
                valley_height_threshold: self.valley_height,
                prominence: self.prominence,
            },
            duration_filter: self.duration_filter.into(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    run(&cli, &mut io::stdout().lock())
}

/// Only the mean wind direction goes to `out`; everything else is logged or sent to stderr.
fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let config = cli.extraction_config();
    info!(
        "Thresholds: peaks >= {} m, valleys <= {} m, prominence >= {} m, filter {:?}",
        config.extremum.peak_height_threshold,
        config.extremum.valley_height_threshold,
        config.extremum.prominence,
        config.duration_filter
    );

    let raw = flight_loader::load_flight(&cli.ifile)
        .with_context(|| format!("failed to load flight data from {}", cli.ifile.display()))?;

    let extraction = profile_extractor::extract_profiles(&raw, &config);

    if cli.no_plot {
        info!("Chart rendering disabled");
    } else {
        let chart_path = profile_chart::chart_path(&cli.obase);
        let title = profile_chart::chart_title(&cli.ifile);
        profile_chart::render_chart(&chart_path, &extraction, &title)
            .with_context(|| format!("failed to render chart {}", chart_path.display()))?;
    }

    let report_path = report_writer::report_path(&cli.obase);
    report_writer::write_report_file(&report_path, &extraction.segments)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;

    profile_extractor::write_extraction_summary(&mut io::stderr().lock(), &extraction)
        .context("failed to write extraction summary")?;

    match wind_summary::summarize_wind_direction(&raw.wind_direction) {
        Some(summary) => {
            info!(
                "Mean wind direction {:.1}° over {} samples",
                summary.mean_degrees, summary.valid_samples
            );
            writeln!(out, "{}", summary.formatted()).context("failed to print mean wind direction")?;
        }
        None => warn!("Mean wind direction not printed"),
    }

    Ok(())
}
