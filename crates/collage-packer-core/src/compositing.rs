use crate::model::Rect;
use image::{Rgba, RgbaImage};

/// The output raster. Only [`Canvas::blit`] and [`Canvas::outline`] write to it.
#[derive(Debug, Clone)]
pub struct Canvas {
    rgba: RgbaImage,
}

impl Canvas {
    /// A `width` x `height` canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: [u8; 4]) -> Self {
        Self {
            rgba: RgbaImage::from_pixel(width, height, Rgba(background)),
        }
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Copies `src` to the top-left of `region`, overwriting existing pixels.
    ///
    /// The written rectangle is `min(src, region)` on each axis and is also clipped to
    /// the canvas, so residual overflow from resampling never escapes the region.
    /// Returns the rectangle actually written.
    pub fn blit(&mut self, src: &RgbaImage, region: Rect) -> Rect {
        let (cw, ch) = self.rgba.dimensions();
        let dx = region.x;
        let dy = region.y;
        let w = src.width().min(region.w).min(cw.saturating_sub(dx));
        let h = src.height().min(region.h).min(ch.saturating_sub(dy));
        for yy in 0..h {
            for xx in 0..w {
                let px = *src.get_pixel(xx, yy);
                self.rgba.put_pixel(dx + xx, dy + yy, px);
            }
        }
        Rect::new(dx, dy, w, h)
    }

    /// Draws a red 1px outline on the bounds of `r` (debug).
    pub fn outline(&mut self, r: Rect) {
        let (cw, ch) = self.rgba.dimensions();
        if r.w == 0 || r.h == 0 {
            return;
        }
        let red = Rgba([255, 0, 0, 255]);
        let right = r.x + r.w - 1;
        let bottom = r.y + r.h - 1;
        for xx in r.x..=right {
            if xx < cw && r.y < ch {
                self.rgba.put_pixel(xx, r.y, red);
            }
            if xx < cw && bottom < ch {
                self.rgba.put_pixel(xx, bottom, red);
            }
        }
        for yy in r.y..=bottom {
            if r.x < cw && yy < ch {
                self.rgba.put_pixel(r.x, yy, red);
            }
            if right < cw && yy < ch {
                self.rgba.put_pixel(right, yy, red);
            }
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.rgba
    }

    pub fn into_image(self) -> RgbaImage {
        self.rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, c: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(c))
    }

    #[test]
    fn blit_clips_to_region() {
        let mut canvas = Canvas::new(20, 20, [0, 0, 0, 0]);
        let written = canvas.blit(&solid(10, 10, [9, 9, 9, 255]), Rect::new(2, 3, 6, 4));
        assert_eq!(written, Rect::new(2, 3, 6, 4));
        assert_eq!(canvas.as_image().get_pixel(7, 6).0, [9, 9, 9, 255]);
        assert_eq!(canvas.as_image().get_pixel(8, 6).0, [0, 0, 0, 0]);
        assert_eq!(canvas.as_image().get_pixel(7, 7).0, [0, 0, 0, 0]);
    }

    #[test]
    fn blit_smaller_image_leaves_rest_of_region() {
        let mut canvas = Canvas::new(10, 10, [1, 2, 3, 4]);
        let written = canvas.blit(&solid(3, 2, [200, 0, 0, 255]), Rect::new(0, 0, 10, 10));
        assert_eq!(written, Rect::new(0, 0, 3, 2));
        assert_eq!(canvas.as_image().get_pixel(3, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn blit_never_leaves_canvas() {
        let mut canvas = Canvas::new(8, 8, [0, 0, 0, 0]);
        let written = canvas.blit(&solid(10, 10, [5, 5, 5, 255]), Rect::new(4, 4, 10, 10));
        assert_eq!(written, Rect::new(4, 4, 4, 4));
    }

    #[test]
    fn blit_overwrites_without_blending() {
        let mut canvas = Canvas::new(4, 4, [0, 0, 0, 0]);
        canvas.blit(&solid(4, 4, [255, 255, 255, 255]), Rect::new(0, 0, 4, 4));
        canvas.blit(&solid(2, 2, [0, 0, 0, 0]), Rect::new(0, 0, 4, 4));
        assert_eq!(canvas.as_image().get_pixel(1, 1).0, [0, 0, 0, 0]);
        assert_eq!(canvas.as_image().get_pixel(2, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn outline_marks_edges_only() {
        let mut canvas = Canvas::new(6, 6, [0, 0, 0, 0]);
        canvas.outline(Rect::new(1, 1, 4, 4));
        assert_eq!(canvas.as_image().get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(canvas.as_image().get_pixel(4, 4).0, [255, 0, 0, 255]);
        assert_eq!(canvas.as_image().get_pixel(2, 2).0, [0, 0, 0, 0]);
    }
}
