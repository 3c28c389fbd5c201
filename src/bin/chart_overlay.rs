// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use image::Rgba;
use log::{info, warn};

use chart_overlay::error::OverlayError;
use chart_overlay::params::{Params, DEFAULT_BACKGROUND_THRESHOLD, DEFAULT_EMPTY_THRESHOLD,
                            DEFAULT_MARGIN_LINES, DEFAULT_MAX_GAP_DEVIATION};
use chart_overlay::prediction::Prediction;
use chart_overlay::series::read_series;

/// Draws an observed series over forecast chart image(s) and crops each
/// chart to its plot.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
struct Args {
    /// Path of the chart image, or a directory of chart images sharing the
    /// same layout.
    #[arg(short, long)]
    input: PathBuf,

    /// File with the observed series, one integer per line.
    #[arg(short, long)]
    series: PathBuf,

    /// Directory where cropped plots are written.
    #[arg(short, long)]
    output: PathBuf,

    /// Units (e.g. days) spanned by the horizontal axis ticks.
    #[arg(long)]
    x_units: f64,

    /// Units spanned by the vertical axis ticks.
    #[arg(long)]
    y_units: f64,

    /// Seed position: a background pixel below and left of the first ticks.
    #[arg(long)]
    seed_x: i32,

    #[arg(long)]
    seed_y: i32,

    /// Title attached to each plot.
    #[arg(short, long)]
    title: Option<String>,

    /// Also write the full-size chart with the series drawn on it.
    #[arg(long, default_value_t = false)]
    save_full: bool,

    /// Channel 0 level at or above which a pixel is background when
    /// scanning for ticks.
    #[arg(long, default_value_t = DEFAULT_BACKGROUND_THRESHOLD)]
    background_threshold: u8,

    /// Relative tick gap deviation that ends a tick scan.
    #[arg(long, default_value_t = DEFAULT_MAX_GAP_DEVIATION)]
    max_gap_deviation: f64,

    /// Channel 0 level at or above which a pixel is blank when cropping.
    #[arg(long, default_value_t = DEFAULT_EMPTY_THRESHOLD)]
    empty_threshold: u8,

    /// Consecutive blank lines that end a crop edge.
    #[arg(long, default_value_t = DEFAULT_MARGIN_LINES)]
    margin_lines: u32,

    /// Series line colour as R,G,B.
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [255u8, 0, 0])]
    color: Vec<u8>,
}

impl Args {
    fn params(&self) -> Params {
        Params{background_threshold: self.background_threshold,
               max_gap_deviation: self.max_gap_deviation,
               empty_threshold: self.empty_threshold,
               margin_lines: self.margin_lines,
               overlay_color: Rgba([self.color[0], self.color[1], self.color[2], 255])}
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !args.output.is_dir() {
        warn!("Output {:?} must be an existing directory", args.output);
        return ExitCode::FAILURE;
    }
    let series = match read_series(&args.series) {
        Ok(series) => series,
        Err(e) => {
            warn!("{}", e);
            return ExitCode::FAILURE;
        },
    };
    info!("Series has {} values", series.len());

    let mut inputs = Vec::<PathBuf>::new();
    if args.input.is_dir() {
        let entries = match fs::read_dir(&args.input) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {:?}: {}", args.input, e);
                return ExitCode::FAILURE;
            },
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                inputs.push(path);
            }
        }
        inputs.sort();
    } else {
        inputs.push(args.input.clone());
    }

    let mut failures = 0;
    for input in &inputs {
        // A chart that does not fit the heuristics is reported and skipped.
        if let Err(e) = process_file(input, &series, &args) {
            warn!("Skipping {:?} due to: {}", input, e);
            failures += 1;
        }
    }
    info!("Processed {} of {} chart(s)", inputs.len() - failures, inputs.len());
    if failures == inputs.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn process_file(input: &Path, series: &[i32], args: &Args) -> Result<(), OverlayError> {
    info!("Processing {:?}", input);
    let start = Instant::now();
    let stem = input.file_stem().map(|s| s.to_os_string()).unwrap_or_else(|| "plot".into());
    let mut output_path = args.output.join(&stem);
    output_path.set_extension("png");

    let mut prediction = Prediction::open(input, args.x_units, args.y_units, series.to_vec())?
        .with_params(args.params());
    if let Some(title) = &args.title {
        prediction = prediction.with_title(title.clone());
    }
    let plot = prediction.process(args.seed_x, args.seed_y)?;
    plot.save(&output_path)?;
    info!("Wrote {:?}: {}x{}, origin at ({}, {}), in {:?}",
          output_path, plot.image.width(), plot.image.height(),
          plot.origin_x, plot.origin_y, start.elapsed());

    if args.save_full {
        let mut full_name = stem;
        full_name.push("_full");
        let mut full_path = args.output.join(full_name);
        full_path.set_extension("png");
        prediction.save(&full_path)?;
        info!("Wrote {:?}", full_path);
    }
    Ok(())
}
