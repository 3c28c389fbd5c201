// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use image::{Rgba, RgbaImage};

/// Pixel position (x, y) with y increasing downward. Signed so that a step
/// off the top or left edge is representable; such positions are simply
/// out of bounds.
pub type Coord = (i32, i32);

/// Maps a position to the next position along a fixed direction.
pub type StepFn = fn(Coord) -> Coord;

pub fn in_bounds(image: &RgbaImage, (x, y): Coord) -> bool {
    let (width, height) = image.dimensions();
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

pub fn pixel_at(image: &RgbaImage, coord: Coord) -> Option<&Rgba<u8>> {
    if in_bounds(image, coord) {
        Some(image.get_pixel(coord.0 as u32, coord.1 as u32))
    } else {
        None
    }
}

// An iterator over a straight run of pixels. Starting at the seed, yields
// each position whose pixel satisfies `accept`, stepping with `step`. The
// first out of bounds or rejected position ends the iteration and is not
// yielded.
pub struct PixelWalk<'a, P> {
    image: &'a RgbaImage,
    step: StepFn,
    accept: P,

    // Position to examine next. None once the walk has ended.
    next: Option<Coord>,
}

impl<'a, P> PixelWalk<'a, P>
where
    P: Fn(&Rgba<u8>) -> bool,
{
    pub fn new(image: &'a RgbaImage, seed: Coord, step: StepFn, accept: P)
               -> PixelWalk<'a, P> {
        PixelWalk{image, step, accept, next: Some(seed)}
    }
}

impl<'a, P> Iterator for PixelWalk<'a, P>
where
    P: Fn(&Rgba<u8>) -> bool,
{
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        let coord = self.next.take()?;
        let pixel = pixel_at(self.image, coord)?;
        if !(self.accept)(pixel) {
            return None;
        }
        self.next = Some((self.step)(coord));
        Some(coord)
    }
}

/// Collects the maximal run of accepted pixels starting at `seed`. An empty
/// result means the seed itself is out of bounds or rejected.
pub fn walk<P>(image: &RgbaImage, seed: Coord, step: StepFn, accept: P) -> Vec<Coord>
where
    P: Fn(&Rgba<u8>) -> bool,
{
    PixelWalk::new(image, seed, step, accept).collect()
}

/// Classifier for the walk: whether channel 0 is at or above `threshold`.
pub fn is_background(pixel: &Rgba<u8>, threshold: u8) -> bool {
    pixel.0[0] >= threshold
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage};
    use imageproc::gray_image;
    use super::*;

    fn rgba(gray: GrayImage) -> RgbaImage {
        DynamicImage::ImageLuma8(gray).to_rgba8()
    }

    fn right(c: Coord) -> Coord { (c.0 + 1, c.1) }
    fn up(c: Coord) -> Coord { (c.0, c.1 - 1) }

    #[test]
    fn test_walk_stops_before_rejected_pixel() {
        let image = rgba(gray_image!(255, 255, 230, 10, 255));
        let run = walk(&image, (0, 0), right, |p| is_background(p, 200));
        assert_eq!(run, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_walk_stops_at_image_edge() {
        let image = rgba(gray_image!(
            255;
            0;
            0;
            255));
        let run = walk(&image, (0, 2), up, |p| !is_background(p, 200));
        assert_eq!(run, vec![(0, 2), (0, 1)]);
        let run = walk(&image, (0, 0), up, |p| is_background(p, 200));
        assert_eq!(run, vec![(0, 0)]);
    }

    #[test]
    fn test_walk_rejected_or_invalid_seed() {
        let image = rgba(gray_image!(0, 255));
        assert!(walk(&image, (0, 0), right, |p| is_background(p, 200)).is_empty());
        assert!(walk(&image, (2, 0), right, |p| is_background(p, 200)).is_empty());
        assert!(walk(&image, (-1, 0), right, |p| is_background(p, 200)).is_empty());
    }

    #[test]
    fn test_walk_is_lazy() {
        let image = rgba(gray_image!(255, 255, 255, 255, 255, 255));
        let mut walker = PixelWalk::new(&image, (1, 0), right, |p| is_background(p, 200));
        assert_eq!(walker.next(), Some((1, 0)));
        assert_eq!(walker.next(), Some((2, 0)));
        assert_eq!(walker.count(), 3);
    }

    #[test]
    fn test_is_background_threshold() {
        assert!(is_background(&Rgba([200, 0, 0, 255]), 200));
        assert!(!is_background(&Rgba([199, 255, 255, 255]), 200));
    }
}
