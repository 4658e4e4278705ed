//! Size arithmetic and pixel resampling for fitting images into regions.
//!
//! The `*_size` functions are pure geometry; the engine uses them to decide
//! placements without touching pixels, and the pixel functions resize to exactly
//! the sizes they return.

use crate::config::ResizeFilter;
use image::RgbaImage;
use image::imageops;

/// Axis pinned by a stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

fn scaled(v: u32, scale: f64) -> u32 {
    ((v as f64 * scale).round() as u32).max(1)
}

/// Largest size with the aspect ratio of `w` x `h` that fits in `max_w` x `max_h`.
/// Images that already fit are returned unchanged (never upscaled).
pub fn thumbnail_size(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    (
        scaled(w, scale).min(max_w.max(1)),
        scaled(h, scale).min(max_h.max(1)),
    )
}

/// Size of `w` x `h` scaled so that `axis` becomes exactly `length`, aspect preserved.
pub fn stretch_size(w: u32, h: u32, axis: Axis, length: u32) -> (u32, u32) {
    let length = length.max(1);
    match axis {
        Axis::Width => (length, scaled(h, length as f64 / w as f64)),
        Axis::Height => (scaled(w, length as f64 / h as f64), length),
    }
}

/// Axis needing the larger scale factor to reach `box_w` x `box_h`. Stretching
/// along it covers the whole box.
pub fn cover_axis(w: u32, h: u32, box_w: u32, box_h: u32) -> Axis {
    let width_ratio = box_w as f64 / w as f64;
    let height_ratio = box_h as f64 / h as f64;
    if width_ratio < height_ratio {
        Axis::Height
    } else {
        Axis::Width
    }
}

/// Smallest aspect-preserving size of `w` x `h` that covers `box_w` x `box_h`.
pub fn cover_size(w: u32, h: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    match cover_axis(w, h, box_w, box_h) {
        Axis::Width => stretch_size(w, h, Axis::Width, box_w),
        Axis::Height => stretch_size(w, h, Axis::Height, box_h),
    }
}

/// Resizes to exactly `w` x `h`. Same-size requests return a copy.
pub fn resample(img: &RgbaImage, w: u32, h: u32, filter: ResizeFilter) -> RgbaImage {
    if img.dimensions() == (w, h) {
        return img.clone();
    }
    imageops::resize(img, w, h, filter.filter_type())
}

/// Scales down to fit within `max_w` x `max_h`, aspect preserved.
pub fn thumbnail(img: &RgbaImage, max_w: u32, max_h: u32, filter: ResizeFilter) -> RgbaImage {
    let (w, h) = thumbnail_size(img.width(), img.height(), max_w, max_h);
    resample(img, w, h, filter)
}

/// Scales so that `axis` measures exactly `length`, aspect preserved.
pub fn stretch(img: &RgbaImage, axis: Axis, length: u32, filter: ResizeFilter) -> RgbaImage {
    let (w, h) = stretch_size(img.width(), img.height(), axis, length);
    resample(img, w, h, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_never_upscales() {
        assert_eq!(thumbnail_size(40, 30, 100, 100), (40, 30));
        assert_eq!(thumbnail_size(100, 100, 100, 100), (100, 100));
    }

    #[test]
    fn thumbnail_is_bounded_by_both_dims() {
        assert_eq!(thumbnail_size(200, 100, 50, 50), (50, 25));
        assert_eq!(thumbnail_size(100, 200, 50, 50), (25, 50));
        assert_eq!(thumbnail_size(1000, 10, 30, 100), (30, 1));
        let (w, h) = thumbnail_size(1234, 777, 321, 123);
        assert!(w <= 321 && h <= 123);
    }

    #[test]
    fn stretch_pins_one_axis() {
        assert_eq!(stretch_size(40, 20, Axis::Width, 80), (80, 40));
        assert_eq!(stretch_size(40, 20, Axis::Height, 25), (50, 25));
    }

    #[test]
    fn cover_fills_the_box() {
        // needs x1.1 in width, x1.05 in height
        let (w, h) = cover_size(50, 40, 55, 42);
        assert_eq!(w, 55);
        assert!(h >= 42);
        let (w, h) = cover_size(50, 40, 52, 48);
        assert_eq!(h, 48);
        assert!(w >= 52);
    }

    #[test]
    fn pixel_resize_matches_size_math() {
        let img = RgbaImage::new(64, 32);
        let t = thumbnail(&img, 20, 20, ResizeFilter::Triangle);
        assert_eq!(t.dimensions(), thumbnail_size(64, 32, 20, 20));
        let s = stretch(&img, Axis::Height, 48, ResizeFilter::Nearest);
        assert_eq!(s.dimensions(), (96, 48));
    }
}
