use serde::{Deserialize, Serialize};

/// Integer canvas coordinate. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
    /// Returns true if the two rectangles share any pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.x2() || r.x >= self.x2() || self.y >= r.y2() || r.y >= self.y2())
    }
}

/// Which pass of the engine produced a placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    /// Native-size first fit into the smallest admissible region.
    FirstFit,
    /// Aspect-ratio matched forced fit into the largest remaining region.
    RatioMatch,
}

/// How the source image was resampled before compositing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitKind {
    /// Composited at native resolution.
    Native,
    /// Scaled down to fit the region, aspect ratio preserved.
    Thumbnail,
    /// Scaled up to cover a region it almost filled, overflow clipped.
    TopUp,
}

/// A single image placed on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    /// Source identifier (usually the input path).
    pub key: String,
    /// Free region the image was assigned to.
    pub region: Rect,
    /// Pixels actually written: `region` top-left, clipped to the region.
    pub frame: Rect,
    /// Size the source is resampled to before clipping.
    pub scaled: (u32, u32),
    /// Native image size.
    pub source_size: (u32, u32),
    pub pass: Pass,
    pub fit: FitKind,
}

impl Placement {
    /// True if the composited image differs in size from the source.
    pub fn resampled(&self) -> bool {
        self.scaled != self.source_size
    }
}

/// Result geometry of a packing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
    /// Items left over once the free regions ran out.
    pub dropped: Vec<String>,
}

/// Statistics about canvas coverage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of placed images.
    pub num_placed: usize,
    /// Images placed at native size by the first pass.
    pub num_first_fit: usize,
    /// Images placed by the ratio-matching pass.
    pub num_ratio_match: usize,
    /// Images that did not make it onto the canvas.
    pub num_dropped: usize,
    /// Images composited at a size other than native.
    pub num_resampled: usize,
    pub canvas_area: u64,
    /// Sum of written frame areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl Layout {
    /// Computes coverage statistics for this layout.
    pub fn stats(&self) -> PackStats {
        let canvas_area = self.width as u64 * self.height as u64;
        let mut num_first_fit = 0;
        let mut num_ratio_match = 0;
        let mut num_resampled = 0;
        let mut used_area = 0u64;
        for p in &self.placements {
            match p.pass {
                Pass::FirstFit => num_first_fit += 1,
                Pass::RatioMatch => num_ratio_match += 1,
            }
            if p.resampled() {
                num_resampled += 1;
            }
            used_area += p.frame.area();
        }
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_placed: self.placements.len(),
            num_first_fit,
            num_ratio_match,
            num_dropped: self.dropped.len(),
            num_resampled,
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Placed: {} (first fit: {}, ratio match: {}), Dropped: {}, Resampled: {}, Occupancy: {:.2}%, Canvas: {} px², Used: {} px²",
            self.num_placed,
            self.num_first_fit,
            self.num_ratio_match,
            self.num_dropped,
            self.num_resampled,
            self.occupancy * 100.0,
            self.canvas_area,
            self.used_area,
        )
    }

    /// Returns uncovered canvas area in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }

    /// Returns uncovered canvas area as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.canvas_area > 0 {
            (self.wasted_area() as f64 / self.canvas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
