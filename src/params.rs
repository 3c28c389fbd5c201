// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use image::Rgba;

/// Pixels with channel 0 at or above this value are background while
/// scanning for axis ticks.
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 200;

/// A tick gap differing from the second measured gap by more than this
/// fraction ends the tick scan.
pub const DEFAULT_MAX_GAP_DEVIATION: f64 = 0.1;

/// Pixels with channel 0 at or above this value count as empty while
/// searching for crop boundaries.
pub const DEFAULT_EMPTY_THRESHOLD: u8 = 250;

/// Number of consecutive empty lines that ends a crop boundary search.
pub const DEFAULT_MARGIN_LINES: u32 = 10;

pub const DEFAULT_OVERLAY_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Tunable thresholds for calibration, drawing and cropping.
///
/// The defaults were chosen empirically on scanned forecast charts of
/// roughly 100-150 DPI. Much lower resolution scans may need a smaller
/// `margin_lines`; noisy scans may need a looser `max_gap_deviation`.
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    pub background_threshold: u8,
    pub max_gap_deviation: f64,
    pub empty_threshold: u8,
    pub margin_lines: u32,
    pub overlay_color: Rgba<u8>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            max_gap_deviation: DEFAULT_MAX_GAP_DEVIATION,
            empty_threshold: DEFAULT_EMPTY_THRESHOLD,
            margin_lines: DEFAULT_MARGIN_LINES,
            overlay_color: DEFAULT_OVERLAY_COLOR,
        }
    }
}
