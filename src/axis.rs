// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::time::Instant;

use image::{Rgba, RgbaImage};
use log::{debug, info};

use crate::error::OverlayError;
use crate::params::Params;
use crate::walker::{in_bounds, is_background, walk, Coord, StepFn};

/// Direction of a tick scan. The vertical axis is scanned upward from the
/// seed (towards larger values); the horizontal axis is scanned rightward.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn step(self) -> StepFn {
        match self {
            Axis::Vertical => |(x, y)| (x, y - 1),
            Axis::Horizontal => |(x, y)| (x + 1, y),
        }
    }

    // Coordinate along the scan direction.
    fn position(self, (x, y): Coord) -> i32 {
        match self {
            Axis::Vertical => y,
            Axis::Horizontal => x,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vertical => write!(f, "vertical"),
            Axis::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Result of scanning one axis for its tick marks.
#[derive(Clone, Debug)]
pub struct AxisCalibration {
    pub axis: Axis,

    /// Leading edge (first mark pixel in scan order) of each detected tick.
    pub ticks: Vec<Coord>,

    /// Leading edges of the first and last detected ticks. `start` is the
    /// axis origin along this direction.
    pub start: Coord,
    pub end: Coord,

    /// Distance in pixels from `start` to `end` along the scan direction.
    pub pixel_extent: u32,

    pub pixels_per_unit: f64,
}

/// Pixel scale of a chart, combined from its two axis calibrations. Valid
/// only for the image it was measured on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisScale {
    /// Pixel position of value 0 on both axes.
    pub origin: Coord,
    pub x_pixels_per_unit: f64,
    pub y_pixels_per_unit: f64,
}

impl AxisScale {
    pub fn new(horizontal: &AxisCalibration, vertical: &AxisCalibration) -> AxisScale {
        AxisScale{origin: (horizontal.start.0, vertical.start.1),
                  x_pixels_per_unit: horizontal.pixels_per_unit,
                  y_pixels_per_unit: vertical.pixels_per_unit}
    }

    /// Image position of the `index`th series value. Larger values are
    /// higher up, i.e. at smaller y.
    pub fn to_pixel(&self, index: usize, value: i32) -> (f64, f64) {
        (self.origin.0 as f64 + index as f64 * self.x_pixels_per_unit,
         self.origin.1 as f64 - value as f64 * self.y_pixels_per_unit)
    }
}

/// Scans from `seed` along `axis` for regularly spaced tick marks and
/// derives the pixel scale of the axis.
///
/// # Arguments
///   `image` - Chart raster. Only channel 0 of each pixel is consulted.
///
///   `seed` - A background pixel below (for the vertical axis) and left of
///   (for the horizontal axis) the first tick.
///
///   `units` - Number of real-world units spanned between the first and the
///   last tick, e.g. the number of days on a time axis.
///
/// The scan alternates between walking background (a gap) and walking mark
/// pixels (a tick). The first two gap lengths are kept as references; any
/// later gap whose length differs from the second reference by more than
/// `params.max_gap_deviation` (relative) means the scan has left the tick
/// region, and scanning stops. Scanning also stops when a gap or tick runs
/// off the image.
///
/// # Errors
/// [OverlayError::InvalidSeed] if the seed is off the image or not
/// background; [OverlayError::AxisNotFound] if no tick is met before the
/// image edge; [OverlayError::AxisCalibrationFailed] if fewer than two gaps
/// were measured.
pub fn calibrate_axis(image: &RgbaImage, seed: Coord, axis: Axis, units: f64,
                      params: &Params) -> Result<AxisCalibration, OverlayError> {
    let scan_start = Instant::now();
    if !(units.is_finite() && units > 0.0) {
        return Err(OverlayError::InvalidUnitCount{axis, units});
    }
    let threshold = params.background_threshold;
    let background = |p: &Rgba<u8>| is_background(p, threshold);
    let mark = |p: &Rgba<u8>| !is_background(p, threshold);
    let step = axis.step();

    let lead_in = walk(image, seed, step, background);
    let Some(&lead_in_end) = lead_in.last() else {
        return Err(OverlayError::InvalidSeed{x: seed.0, y: seed.1});
    };
    let mut next = step(lead_in_end);
    if !in_bounds(image, next) {
        return Err(OverlayError::AxisNotFound{axis, x: seed.0, y: seed.1});
    }

    let mut ticks = Vec::<Coord>::new();
    let mut first_gap: Option<usize> = None;
    let mut second_gap: Option<usize> = None;
    loop {
        let tick = walk(image, next, step, mark);
        let (Some(&tick_start), Some(&tick_end)) = (tick.first(), tick.last()) else {
            break;
        };
        ticks.push(tick_start);

        let gap = walk(image, step(tick_end), step, background);
        let Some(&gap_end) = gap.last() else {
            // Tick runs to the image edge.
            break;
        };
        let gap_len = gap.len();
        debug!("{} tick at {:?} width {}, gap {}",
               axis, tick_start, tick.len(), gap_len);
        match (first_gap, second_gap) {
            (None, _) => first_gap = Some(gap_len),
            (Some(_), None) => second_gap = Some(gap_len),
            (Some(_), Some(reference)) => {
                let deviation =
                    (gap_len as f64 - reference as f64).abs() / reference as f64;
                if deviation > params.max_gap_deviation {
                    debug!("{} gap {} deviates {:.3} from {}; end of ticks",
                           axis, gap_len, deviation, reference);
                    break;
                }
            }
        }

        next = step(gap_end);
        if !in_bounds(image, next) {
            break;
        }
    }

    if second_gap.is_none() {
        let gaps = usize::from(first_gap.is_some());
        return Err(OverlayError::AxisCalibrationFailed{
            axis, x: seed.0, y: seed.1, gaps});
    }
    // Two gap measurements imply at least two ticks.
    let start = ticks[0];
    let end = ticks[ticks.len() - 1];
    let pixel_extent = (axis.position(end) - axis.position(start)).unsigned_abs();
    let pixels_per_unit = pixel_extent as f64 / units;
    info!("{} axis: {} ticks from {:?} to {:?}, {:.3} pixels per unit in {:?}",
          axis, ticks.len(), start, end, pixels_per_unit, scan_start.elapsed());
    Ok(AxisCalibration{axis, ticks, start, end, pixel_extent, pixels_per_unit})
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use image::{DynamicImage, GrayImage, Luma, Rgba};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::gray_image;
    use imageproc::rect::Rect;
    use super::*;

    fn rgba(gray: GrayImage) -> RgbaImage {
        DynamicImage::ImageLuma8(gray).to_rgba8()
    }

    // A white image with `count` vertical ticks of the given width, the
    // first at x = `first_x`, spanning rows 40..60.
    fn horizontal_ticks(width: u32, first_x: i32, spacing: i32, tick_width: u32,
                        count: i32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, 100, Rgba([255, 255, 255, 255]));
        for i in 0..count {
            draw_filled_rect_mut(&mut image,
                                 Rect::at(first_x + i * spacing, 40).of_size(tick_width, 20),
                                 Rgba([0, 0, 0, 255]));
        }
        image
    }

    #[test]
    fn test_tick_spacing() {
        let image = horizontal_ticks(600, 20, 25, 3, 12);
        let cal = calibrate_axis(&image, (5, 50), Axis::Horizontal, 11.0,
                                 &Params::default()).unwrap();
        assert_eq!(cal.ticks.len(), 12);
        assert_eq!(cal.start, (20, 50));
        assert_eq!(cal.end, (20 + 11 * 25, 50));
        assert!((cal.pixel_extent as i32 - 11 * 25).abs() <= 1);
        assert_abs_diff_eq!(cal.pixels_per_unit, 25.0, epsilon = 0.01);
    }

    #[test]
    fn test_vertical_ticks_scan_upward() {
        let mut gray = GrayImage::from_pixel(10, 60, Luma([255]));
        for y in [50, 40, 30, 20] {
            gray.put_pixel(4, y, Luma([30]));
        }
        let image = rgba(gray);
        let cal = calibrate_axis(&image, (4, 55), Axis::Vertical, 3.0,
                                 &Params::default()).unwrap();
        assert_eq!(cal.ticks, vec![(4, 50), (4, 40), (4, 30), (4, 20)]);
        assert_eq!(cal.pixel_extent, 30);
        assert_abs_diff_eq!(cal.pixels_per_unit, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_irregular_gap_ends_scan() {
        // Four ticks 25 apart, then a mark 60 further (e.g. the plotted line).
        let mut image = horizontal_ticks(400, 20, 25, 2, 4);
        draw_filled_rect_mut(&mut image, Rect::at(20 + 3 * 25 + 60, 0).of_size(2, 100),
                             Rgba([0, 0, 0, 255]));
        let cal = calibrate_axis(&image, (0, 50), Axis::Horizontal, 3.0,
                                 &Params::default()).unwrap();
        assert_eq!(cal.ticks.len(), 4);
        assert_eq!(cal.end, (95, 50));
    }

    #[test]
    fn test_gap_deviation_is_configurable() {
        // Gaps of 23 and 25 pixels, deviating 8% from the reference.
        let mut gray = GrayImage::from_pixel(120, 1, Luma([255]));
        for x in [10, 34, 60, 86, 110] {
            gray.put_pixel(x, 0, Luma([0]));
        }
        let image = rgba(gray);
        let cal = calibrate_axis(&image, (0, 0), Axis::Horizontal, 1.0,
                                 &Params::default()).unwrap();
        assert_eq!(cal.ticks.len(), 5);
        let strict = Params{max_gap_deviation: 0.05, ..Params::default()};
        let cal = calibrate_axis(&image, (0, 0), Axis::Horizontal, 1.0, &strict).unwrap();
        assert_eq!(cal.ticks.len(), 4);
    }

    #[test]
    fn test_single_tick_fails_calibration() {
        let image = horizontal_ticks(200, 50, 25, 2, 1);
        match calibrate_axis(&image, (10, 50), Axis::Horizontal, 1.0, &Params::default()) {
            Err(OverlayError::AxisCalibrationFailed{axis, gaps, ..}) => {
                assert_eq!(axis, Axis::Horizontal);
                assert_eq!(gaps, 1);
            },
            other => panic!("Expected calibration failure, got {:?}", other),
        }
    }

    #[test]
    fn test_tick_at_image_edge_fails_calibration() {
        let image = rgba(gray_image!(255, 255, 0, 0));
        match calibrate_axis(&image, (0, 0), Axis::Horizontal, 1.0, &Params::default()) {
            Err(OverlayError::AxisCalibrationFailed{gaps, ..}) => assert_eq!(gaps, 0),
            other => panic!("Expected calibration failure, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_errors() {
        let image = rgba(gray_image!(255, 0, 255, 255));
        assert!(matches!(
            calibrate_axis(&image, (1, 0), Axis::Horizontal, 1.0, &Params::default()),
            Err(OverlayError::InvalidSeed{x: 1, y: 0})));
        assert!(matches!(
            calibrate_axis(&image, (9, 0), Axis::Horizontal, 1.0, &Params::default()),
            Err(OverlayError::InvalidSeed{..})));
        assert!(matches!(
            calibrate_axis(&image, (2, 0), Axis::Horizontal, 1.0, &Params::default()),
            Err(OverlayError::AxisNotFound{axis: Axis::Horizontal, ..})));
        assert!(matches!(
            calibrate_axis(&image, (0, 0), Axis::Vertical, 1.0, &Params::default()),
            Err(OverlayError::AxisNotFound{axis: Axis::Vertical, ..})));
    }

    #[test]
    fn test_invalid_unit_count() {
        let image = horizontal_ticks(200, 50, 25, 2, 4);
        assert!(matches!(
            calibrate_axis(&image, (10, 50), Axis::Horizontal, 0.0, &Params::default()),
            Err(OverlayError::InvalidUnitCount{..})));
    }
}
