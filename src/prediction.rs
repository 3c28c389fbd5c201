// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::cmp::{max, min};
use std::path::Path;
use std::time::Instant;

use image::RgbaImage;
use imageproc::rect::Rect;
use log::info;

use crate::axis::{calibrate_axis, Axis, AxisScale};
use crate::crop::auto_crop;
use crate::error::OverlayError;
use crate::overlay::draw_series;
use crate::params::Params;
use crate::walker::Coord;

/// A cropped chart with the observed series drawn on it.
#[derive(Clone, Debug)]
pub struct Plot {
    pub image: RgbaImage,

    /// Position of the axis origin within `image`.
    pub origin_x: u32,
    pub origin_y: u32,

    pub title: Option<String>,
}

impl Plot {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OverlayError> {
        self.image.save(path)?;
        Ok(())
    }
}

/// A forecast chart image together with the observed series to draw on it.
pub struct Prediction {
    image: RgbaImage,

    // Number of units spanned by the ticks of each axis.
    x_units: f64,
    y_units: f64,

    series: Vec<i32>,
    params: Params,
    title: Option<String>,
}

impl Prediction {
    pub fn new(image: RgbaImage, x_units: f64, y_units: f64, series: Vec<i32>)
               -> Prediction {
        Prediction{image, x_units, y_units, series,
                   params: Params::default(), title: None}
    }

    /// Loads the chart from `path`. Any colour type is accepted; channel 0 of
    /// the RGBA conversion is used as intensity.
    pub fn open<P: AsRef<Path>>(path: P, x_units: f64, y_units: f64, series: Vec<i32>)
                                -> Result<Prediction, OverlayError> {
        let image = image::open(path)?.into_rgba8();
        Ok(Prediction::new(image, x_units, y_units, series))
    }

    pub fn with_params(mut self, params: Params) -> Prediction {
        self.params = params;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Prediction {
        self.title = Some(title.into());
        self
    }

    /// The chart, including anything drawn by [Prediction::process()].
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Calibrates both axes by scanning from the seed, without drawing.
    pub fn calibrate(&self, seed: Coord) -> Result<(AxisScale, Rect), OverlayError> {
        let vertical = calibrate_axis(&self.image, seed, Axis::Vertical,
                                      self.y_units, &self.params)?;
        let horizontal = calibrate_axis(&self.image, seed, Axis::Horizontal,
                                        self.x_units, &self.params)?;
        let scale = AxisScale::new(&horizontal, &vertical);
        // Box spanned by the tick scans, with the origin at its bottom left.
        let axis_box = Rect::at(scale.origin.0, scale.origin.1 - vertical.pixel_extent as i32)
            .of_size(horizontal.pixel_extent + 1, vertical.pixel_extent + 1);
        Ok((scale, axis_box))
    }

    /// Locates the chart axes from the seed position, draws the series over
    /// the chart and crops the result to the plot.
    ///
    /// The seed should be a background pixel below the lowest vertical axis
    /// tick and left of the first horizontal axis tick, so that scanning up
    /// and right from it crosses the ticks.
    ///
    /// The chart image is modified in place; calling `process` again draws
    /// the series a second time.
    pub fn process(&mut self, seed_x: i32, seed_y: i32) -> Result<Plot, OverlayError> {
        let process_start = Instant::now();
        let (scale, axis_box) = self.calibrate((seed_x, seed_y))?;
        let overlay_box = draw_series(&mut self.image, &self.series, &scale,
                                      self.params.overlay_color);
        let bounds = match overlay_box {
            Some(overlay_box) => crop_start(&axis_box, &overlay_box, self.image.dimensions(),
                                            self.params.margin_lines),
            None => axis_box,
        };
        let (image, (origin_x, origin_y)) =
            auto_crop(&self.image, &bounds, scale.origin, &self.params)?;
        info!("Processed {}x{} chart to {}x{} plot in {:?}",
              self.image.width(), self.image.height(),
              image.width(), image.height(), process_start.elapsed());
        Ok(Plot{image, origin_x: origin_x as u32, origin_y: origin_y as u32,
                title: self.title.clone()})
    }

    /// Writes the full chart image, including any drawn series.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OverlayError> {
        self.image.save(path)?;
        Ok(())
    }
}

// Box the crop grows from: the axis box extended to cover the drawn series.
// The series only extends it up to `margin` lines short of each image
// border, leaving room for the empty margin the crop search needs. Series
// running off the image are cut at that point.
fn crop_start(axis_box: &Rect, overlay_box: &Rect, (width, height): (u32, u32), margin: u32)
              -> Rect {
    let margin = margin as i32;
    let left = min(axis_box.left(), max(overlay_box.left(), margin));
    let top = min(axis_box.top(), max(overlay_box.top(), margin));
    let right = max(axis_box.right(), min(overlay_box.right(), width as i32 - 1 - margin));
    let bottom = max(axis_box.bottom(), min(overlay_box.bottom(), height as i32 - 1 - margin));
    Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32)
}
