// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::time::Instant;

use image::{imageops, RgbaImage};
use imageproc::rect::Rect;
use log::{debug, info};

use crate::error::OverlayError;
use crate::params::Params;
use crate::walker::Coord;

// An iterator over the channel 0 values of a region of interest. Yields
// pixels in raster scan order.
struct EnumeratePixels<'a> {
    image: &'a RgbaImage,
    roi: &'a Rect,

    // Identifies the next pixel to be yielded. If cur_y is beyond the ROI's
    // bottom, the iteration is finished.
    cur_x: i32,
    cur_y: i32,
}

impl<'a> EnumeratePixels<'a> {
    fn new(image: &'a RgbaImage, roi: &'a Rect) -> EnumeratePixels<'a> {
        let (width, height) = image.dimensions();
        assert!(roi.left() >= 0);
        assert!(roi.top() >= 0);
        assert!(roi.right() < width as i32);
        assert!(roi.bottom() < height as i32);
        EnumeratePixels{image, roi, cur_x: roi.left(), cur_y: roi.top()}
    }
}

impl<'a> Iterator for EnumeratePixels<'a> {
    type Item = (i32, i32, u8);  // x, y, channel 0 value.

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur_y > self.roi.bottom() {
            return None;
        }
        let item: Self::Item = (self.cur_x, self.cur_y,
                                self.image.get_pixel(
                                    self.cur_x as u32, self.cur_y as u32).0[0]);
        if self.cur_x == self.roi.right() {
            self.cur_x = self.roi.left();
            self.cur_y += 1;
        } else {
            self.cur_x += 1;
        }
        Some(item)
    }
}

/// One side of a crop box.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Order in which [auto_crop()] adjusts the edges.
    pub const ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    fn position(self, bounds: &Rect) -> i32 {
        match self {
            Edge::Top => bounds.top(),
            Edge::Bottom => bounds.bottom(),
            Edge::Left => bounds.left(),
            Edge::Right => bounds.right(),
        }
    }

    fn outward(self) -> i32 {
        match self {
            Edge::Top | Edge::Left => -1,
            Edge::Bottom | Edge::Right => 1,
        }
    }

    // The full line at `position` beyond this edge, restricted to the
    // perpendicular extent of `bounds`.
    fn line(self, bounds: &Rect, position: i32) -> Rect {
        match self {
            Edge::Top | Edge::Bottom =>
                Rect::at(bounds.left(), position).of_size(bounds.width(), 1),
            Edge::Left | Edge::Right =>
                Rect::at(position, bounds.top()).of_size(1, bounds.height()),
        }
    }

    fn is_inside(self, position: i32, (width, height): (u32, u32)) -> bool {
        let limit = match self {
            Edge::Top | Edge::Bottom => height,
            Edge::Left | Edge::Right => width,
        };
        position >= 0 && position < limit as i32
    }

    // `bounds` with this edge moved to `position`.
    fn moved(self, bounds: &Rect, position: i32) -> Rect {
        let (mut left, mut top) = (bounds.left(), bounds.top());
        let (mut right, mut bottom) = (bounds.right(), bounds.bottom());
        match self {
            Edge::Top => top = position,
            Edge::Bottom => bottom = position,
            Edge::Left => left = position,
            Edge::Right => right = position,
        }
        Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => write!(f, "top"),
            Edge::Bottom => write!(f, "bottom"),
            Edge::Left => write!(f, "left"),
            Edge::Right => write!(f, "right"),
        }
    }
}

/// Outcome of moving one crop edge outward.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoundarySearch {
    /// New position of the edge: the outermost non-empty line found, or the
    /// original edge if every examined line was empty.
    pub boundary: i32,

    /// Number of lines examined beyond the original edge.
    pub lines_scanned: u32,
}

fn line_is_empty(image: &RgbaImage, line: &Rect, empty_threshold: u8) -> bool {
    EnumeratePixels::new(image, line).all(|(_x, _y, value)| value >= empty_threshold)
}

/// Moves `edge` of `bounds` outward a line at a time until
/// `params.margin_lines` consecutive empty lines have been seen. A line is
/// empty if every pixel of it within the perpendicular extent of `bounds`
/// has channel 0 at or above `params.empty_threshold`. A non-empty line
/// restarts the count, so marks separated by less than the margin are
/// absorbed into the crop.
///
/// `bounds` must lie within `image`.
///
/// # Errors
/// [OverlayError::CropOutOfBounds] if the image edge is reached first.
pub fn find_boundary(image: &RgbaImage, bounds: &Rect, edge: Edge, params: &Params)
                     -> Result<BoundarySearch, OverlayError> {
    let mut boundary = edge.position(bounds);
    let mut position = boundary;
    let mut lines_scanned = 0;
    let mut empty_run = 0;
    while empty_run < params.margin_lines {
        position += edge.outward();
        if !edge.is_inside(position, image.dimensions()) {
            return Err(OverlayError::CropOutOfBounds{edge, line: position});
        }
        lines_scanned += 1;
        if line_is_empty(image, &edge.line(bounds, position), params.empty_threshold) {
            empty_run += 1;
        } else {
            debug!("{} line {} has content", edge, position);
            empty_run = 0;
            boundary = position;
        }
    }
    Ok(BoundarySearch{boundary, lines_scanned})
}

/// Grows `bounds` edge by edge (top, bottom, left, then right, each pass
/// seeing the result of the previous ones) so that it encloses the plot
/// content next to it. See [find_boundary()].
pub fn fit_bounds(image: &RgbaImage, bounds: &Rect, params: &Params)
                  -> Result<Rect, OverlayError> {
    let mut fitted = *bounds;
    for edge in Edge::ORDER {
        let search = find_boundary(image, &fitted, edge, params)?;
        fitted = edge.moved(&fitted, search.boundary);
    }
    Ok(fitted)
}

/// Crops `image` to the content surrounding `bounds`. Returns the cropped
/// copy together with `origin` translated to the crop's coordinates.
///
/// `bounds` must lie within `image` and contain `origin`.
pub fn auto_crop(image: &RgbaImage, bounds: &Rect, origin: Coord, params: &Params)
                 -> Result<(RgbaImage, Coord), OverlayError> {
    let crop_start = Instant::now();
    let fitted = fit_bounds(image, bounds, params)?;
    debug_assert!(fitted.left() <= origin.0 && origin.0 <= fitted.right());
    debug_assert!(fitted.top() <= origin.1 && origin.1 <= fitted.bottom());
    let cropped = imageops::crop_imm(image, fitted.left() as u32, fitted.top() as u32,
                                     fitted.width(), fitted.height()).to_image();
    let local_origin = (origin.0 - fitted.left(), origin.1 - fitted.top());
    info!("Cropped {:?} to {:?}, origin at {:?} in {:?}",
          bounds, fitted, local_origin, crop_start.elapsed());
    Ok((cropped, local_origin))
}
