use crate::config::SplitOrientation;
use crate::model::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A free axis-aligned rectangle on the canvas, stored by its corners.
///
/// Regions are values: splitting produces new regions and leaves `self` untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Region {
    top_left: Point,
    bottom_right: Point,
}

impl Region {
    /// Creates a region; a `bottom_right` above or left of `top_left` collapses to zero extent.
    pub fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right: Point::new(
                bottom_right.x.max(top_left.x),
                bottom_right.y.max(top_left.y),
            ),
        }
    }

    /// The region covering a whole `width` x `height` canvas.
    pub fn canvas(width: u32, height: u32) -> Self {
        Self::new(Point::new(0, 0), Point::new(width, height))
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y - self.top_left.y
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// `width / height`, or 0 for a region without height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height() == 0 {
            0.0
        } else {
            self.width() as f32 / self.height() as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// A region is usable only if both sides exceed `tolerance`.
    pub fn is_valid(&self, tolerance: u32) -> bool {
        !self.is_empty() && self.width() > tolerance && self.height() > tolerance
    }

    /// True if a `width` x `height` image fits without resampling.
    pub fn big_enough(&self, width: u32, height: u32) -> bool {
        width <= self.width() && height <= self.height()
    }

    /// Guillotine cut of the leftover after a `width` x `height` footprint is placed
    /// flush at the top-left corner. Returns `(right, bottom)`; either may be empty.
    ///
    /// The footprint is clamped to the region, so the two children plus the footprint
    /// always cover exactly the area of `self`.
    pub fn split(&self, width: u32, height: u32, orientation: SplitOrientation) -> (Region, Region) {
        let w = width.min(self.width());
        let h = height.min(self.height());
        let cut = Point::new(self.top_left.x + w, self.top_left.y + h);
        match orientation {
            SplitOrientation::VerticalMajor => {
                let right = Region::new(Point::new(cut.x, self.top_left.y), self.bottom_right);
                let bottom = Region::new(
                    Point::new(self.top_left.x, cut.y),
                    Point::new(cut.x, self.bottom_right.y),
                );
                (right, bottom)
            }
            SplitOrientation::HorizontalMajor => {
                let right = Region::new(
                    Point::new(cut.x, self.top_left.y),
                    Point::new(self.bottom_right.x, cut.y),
                );
                let bottom = Region::new(Point::new(self.top_left.x, cut.y), self.bottom_right);
                (right, bottom)
            }
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.top_left.x, self.top_left.y, self.width(), self.height())
    }
}

impl From<Rect> for Region {
    fn from(r: Rect) -> Self {
        Region::new(Point::new(r.x, r.y), Point::new(r.x2(), r.y2()))
    }
}
