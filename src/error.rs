// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::path::PathBuf;

use crate::axis::Axis;
use crate::crop::Edge;

/// Reasons a chart image could not be calibrated, overlaid or cropped.
///
/// None of these are retried: the same inputs give the same geometry. A
/// caller processing several charts should log the failure and continue
/// with the next image.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("seed ({x}, {y}) is outside the image or not on background")]
    InvalidSeed { x: i32, y: i32 },

    #[error("no {axis} axis ticks found scanning from seed ({x}, {y})")]
    AxisNotFound { axis: Axis, x: i32, y: i32 },

    #[error("{axis} axis from seed ({x}, {y}) has {gaps} tick gap(s); need at least 2")]
    AxisCalibrationFailed { axis: Axis, x: i32, y: i32, gaps: usize },

    #[error("{edge} crop boundary reached the image edge at line {line} without a clean margin")]
    CropOutOfBounds { edge: Edge, line: i32 },

    #[error("{axis} axis unit count must be positive, got {units}")]
    InvalidUnitCount { axis: Axis, units: f64 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot read series file {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("series file {path:?} line {line}: {text:?} is not an integer")]
    SeriesParse { path: PathBuf, line: usize, text: String },
}
