//! tourline-bench: CLI tool for tolerance experimentation and diagnostics.
//!
//! Loads a recorded series from a JSON file, simplifies it with
//! configurable parameters, and prints diagnostics. Useful for:
//!
//! - Tuning the tolerance for a given kind of series (elevation, speed)
//! - Checking how tour boundaries affect the retained point count
//! - Measuring simplification time on large recordings
//!
//! # Input
//!
//! Either a single tour, `[[x, y], ...]`, or several tours to be
//! concatenated, `[[[x, y], ...], ...]`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin tourline-bench -- [OPTIONS] <SERIES_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to see per-call simplifier events.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tourline_simplify::diagnostics::{SimplifyDiagnostics, WebClock};
use tourline_simplify::elevation::{direction_segments, elevation_change};
use tourline_simplify::series::ConcatenatedSeries;
use tourline_simplify::{Point, RetainedPoint, RetentionReason, SimplifyConfig};

/// Tolerance experimentation and diagnostics for tourline.
///
/// Simplifies a recorded series with configurable parameters and prints
/// timing, point-count and deviation diagnostics.
#[derive(Parser)]
#[command(name = "tourline-bench", version)]
struct Cli {
    /// Path to the input series (JSON).
    series_path: PathBuf,

    /// Maximum distance between a discarded point and its replacement segment.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Let tour joins be simplified away like any other point.
    #[arg(long)]
    ignore_tour_boundaries: bool,

    /// Also report elevation gain/loss and direction segments.
    #[arg(long)]
    elevation: bool,

    /// Write the simplified series to this file as JSON.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full simplify config as a JSON string.
    ///
    /// When provided, all other simplify parameter flags are ignored.
    /// The JSON must be a valid `SimplifyConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Accepted shapes of the input file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesFile {
    /// Several tours, concatenated in order.
    Tours(Vec<Vec<(f64, f64)>>),
    /// A single tour.
    Single(Vec<(f64, f64)>),
}

/// One entry of the `--output` file.
#[derive(Serialize)]
struct OutputPoint {
    #[serde(flatten)]
    point: Point,
    reason: RetentionReason,
}

/// Build a [`SimplifyConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<SimplifyConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SimplifyConfig {
            tolerance: cli.tolerance,
            respect_tour_boundaries: !cli.ignore_tour_boundaries,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Read and parse the input series.
fn load_series(path: &Path) -> Result<ConcatenatedSeries, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let file: SeriesFile = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    Ok(match file {
        SeriesFile::Tours(tours) => ConcatenatedSeries::from_tours(&tours),
        SeriesFile::Single(tour) => ConcatenatedSeries::from_tours(&[tour]),
    })
}

/// Write the retained points as a JSON array.
fn write_output(path: &Path, retained: &[RetainedPoint]) -> Result<(), String> {
    let entries: Vec<OutputPoint> = retained
        .iter()
        .map(|r| OutputPoint {
            point: r.point,
            reason: r.reason,
        })
        .collect();
    let json = serde_json::to_string_pretty(&entries)
        .map_err(|e| format!("Error serializing output: {e}"))?;
    std::fs::write(path, &json).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    info!(path = %path.display(), bytes = json.len(), "wrote simplified series");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    let series = load_series(&cli.series_path)?;

    info!(
        path = %cli.series_path.display(),
        points = series.points.len(),
        tours = series.tour_count(),
        ?config,
        runs = cli.runs,
        "loaded series"
    );

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        let (retained, diagnostics) = tourline_simplify::diagnostics::simplify_with_diagnostics(
            &config,
            &series.points,
            series.forced_indices(),
            &WebClock,
        )
        .map_err(|e| format!("Simplify error: {e}"))?;

        if cli.json {
            let json = serde_json::to_string_pretty(&diagnostics)
                .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
            println!("{json}");
        } else {
            if cli.runs > 1 {
                println!("--- Run {}/{} ---", run + 1, cli.runs);
            }
            println!("{}", diagnostics.report());
        }

        // Elevation and output only depend on the result, not timing.
        if run == 0 {
            if cli.elevation {
                print_elevation(&retained, series.forced_indices());
            }
            if let Some(ref path) = cli.output {
                write_output(path, &retained)?;
            }
        }

        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    Ok(())
}

/// Print elevation gain/loss and direction segments of the simplified profile.
fn print_elevation(retained: &[RetainedPoint], forced_indices: &[usize]) {
    let profile: Vec<Point> = retained.iter().map(|r| r.point).collect();
    let change = elevation_change(&profile);
    let segments = direction_segments(&profile, forced_indices);

    println!();
    println!("Elevation gain: {:.1}", change.gain);
    println!("Elevation loss: {:.1}", change.loss);
    println!(
        "Direction segments: {} ({:?})",
        segments.len().saturating_sub(1),
        segments
    );
}

/// Print aggregated timing across multiple runs.
fn print_multi_run_summary(all_diagnostics: &[SimplifyDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    #[allow(clippy::cast_precision_loss)]
    let mean = durations.iter().sum::<f64>() / durations.len().max(1) as f64;

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );
    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}
