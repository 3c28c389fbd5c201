// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::cmp::{max, min};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;
use imageproc::rect::Rect;
use log::debug;

use crate::axis::AxisScale;
use crate::walker::Coord;

/// Polyline points for `series` in image coordinates, starting at the
/// origin of `scale`.
pub fn series_points(series: &[i32], scale: &AxisScale) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(series.len() + 1);
    points.push((scale.origin.0 as f64, scale.origin.1 as f64));
    points.extend(series.iter().enumerate()
                  .map(|(index, &value)| scale.to_pixel(index, value)));
    points
}

/// Polyline vertices for `series`, starting at the origin of `scale`,
/// truncated to whole pixels. Coordinates beyond the `i32` range saturate.
pub fn series_vertices(series: &[i32], scale: &AxisScale) -> Vec<Coord> {
    series_points(series, scale).iter().map(|&(x, y)| (x as i32, y as i32)).collect()
}

/// Draws `series` onto `image` as a connected, antialiased line in `color`,
/// overwriting what is underneath. Each segment is clipped to the image
/// (plus a one pixel border) before it is rasterized, so parts of the line
/// falling outside the image cost nothing and are dropped.
///
/// Returns the bounding box of the line clipped to the image, or None if
/// nothing was drawn on the image.
pub fn draw_series(image: &mut RgbaImage, series: &[i32], scale: &AxisScale,
                   color: Rgba<u8>) -> Option<Rect> {
    if series.is_empty() {
        return None;
    }
    let (width, height) = image.dimensions();
    let window = (-1.0, -1.0, width as f64, height as f64);
    let points = series_points(series, scale);
    let mut drawn = Vec::<Coord>::with_capacity(2 * series.len());
    for segment in points.windows(2) {
        let Some((start, end)) = clip_segment(segment[0], segment[1], window) else {
            continue;
        };
        let start = (start.0 as i32, start.1 as i32);
        let end = (end.0 as i32, end.1 as i32);
        draw_antialiased_line_segment_mut(image, start, end, color, interpolate);
        drawn.push(start);
        drawn.push(end);
    }
    let bounds = clipped_bounds(&drawn, (width, height));
    debug!("Drew {} points, {} segments visible, bounds {:?}",
           series.len(), drawn.len() / 2, bounds);
    bounds
}

// Part of the segment from `a` to `b` lying within the (left, top, right,
// bottom) window, using Liang-Barsky parametric clipping. None if the segment
// misses the window.
fn clip_segment(a: (f64, f64), b: (f64, f64), (left, top, right, bottom): (f64, f64, f64, f64))
                -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, a.0 - left), (dx, right - a.0), (-dy, a.1 - top), (dy, bottom - a.1)] {
        if p == 0.0 {
            // Parallel to this window edge.
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
    }
    Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
}

fn clipped_bounds(vertices: &[Coord], (width, height): (u32, u32)) -> Option<Rect> {
    let left = vertices.iter().map(|v| v.0).min()?;
    let right = vertices.iter().map(|v| v.0).max()?;
    let top = vertices.iter().map(|v| v.1).min()?;
    let bottom = vertices.iter().map(|v| v.1).max()?;
    if right < 0 || bottom < 0 || left >= width as i32 || top >= height as i32 {
        return None;
    }
    let left = max(left, 0);
    let top = max(top, 0);
    let right = min(right, width as i32 - 1);
    let bottom = min(bottom, height as i32 - 1);
    Some(Rect::at(left, top).of_size((right - left + 1) as u32,
                                     (bottom - top + 1) as u32))
}
