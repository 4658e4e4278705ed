use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Packing configuration.
// Key notes:
//   - `sliver_tolerance` discards free regions whose width or height is not above it
//   - `near_fit_margin` triggers the top-up rescale when both leftover margins are below it
//   - `ratio_metric` selects how the second pass matches items to regions

/// Guillotine cut orientation used after each placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitOrientation {
    /// Right remainder spans the full region height; bottom remainder is as wide as the image.
    VerticalMajor,
    /// Bottom remainder spans the full region width; right remainder is as tall as the image.
    HorizontalMajor,
}

impl FromStr for SplitOrientation {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v" | "vertical" | "vertical_major" => Ok(Self::VerticalMajor),
            "h" | "horizontal" | "horizontal_major" => Ok(Self::HorizontalMajor),
            _ => Err(()),
        }
    }
}

/// Scoring used by the ratio-matching pass. Lower scores win.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatioMetric {
    /// `|item.ratio - region.ratio|`. Ignores absolute size.
    AspectRatio,
    /// Aspect ratio difference plus the relative area mismatch between item and region.
    AspectRatioAndArea,
}

impl FromStr for RatioMetric {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ratio" | "aspect_ratio" => Ok(Self::AspectRatio),
            "ratio_area" | "aspect_ratio_and_area" => Ok(Self::AspectRatioAndArea),
            _ => Err(()),
        }
    }
}

/// Resampling filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear.
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "bilinear" => Ok(Self::Triangle),
            "catmullrom" | "catmull_rom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,

    /// Free regions must be wider and taller than this (pixels).
    #[serde(default = "default_tolerance")]
    pub sliver_tolerance: u32,
    /// Top-up an image when both leftover margins are below this (pixels).
    #[serde(default = "default_tolerance")]
    pub near_fit_margin: u32,

    #[serde(default = "default_split")]
    pub split: SplitOrientation,
    #[serde(default = "default_ratio_metric")]
    pub ratio_metric: RatioMetric,
    #[serde(default = "default_filter")]
    pub filter: ResizeFilter,

    /// RGBA fill for uncovered canvas pixels.
    #[serde(default)]
    pub background: [u8; 4],
    /// Draw red outlines around placed images (debug).
    #[serde(default)]
    pub outlines: bool,

    /// Probe input headers in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 2560,
            canvas_height: 1080,
            sliver_tolerance: default_tolerance(),
            near_fit_margin: default_tolerance(),
            split: default_split(),
            ratio_metric: default_ratio_metric(),
            filter: default_filter(),
            background: [0, 0, 0, 0],
            outlines: false,
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the canvas has a zero side. The sliver tolerance only
    /// filters split children, so any tolerance is accepted here.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CollageError;

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(CollageError::InvalidDimensions {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        Ok(())
    }
}

fn default_tolerance() -> u32 {
    10
}
fn default_split() -> SplitOrientation {
    SplitOrientation::VerticalMajor
}
fn default_ratio_metric() -> RatioMetric {
    RatioMetric::AspectRatio
}
fn default_filter() -> ResizeFilter {
    ResizeFilter::Triangle
}
fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_canvas(mut self, w: u32, h: u32) -> Self {
        self.cfg.canvas_width = w;
        self.cfg.canvas_height = h;
        self
    }
    pub fn sliver_tolerance(mut self, v: u32) -> Self {
        self.cfg.sliver_tolerance = v;
        self
    }
    pub fn near_fit_margin(mut self, v: u32) -> Self {
        self.cfg.near_fit_margin = v;
        self
    }
    pub fn split(mut self, v: SplitOrientation) -> Self {
        self.cfg.split = v;
        self
    }
    pub fn ratio_metric(mut self, v: RatioMetric) -> Self {
        self.cfg.ratio_metric = v;
        self
    }
    pub fn filter(mut self, v: ResizeFilter) -> Self {
        self.cfg.filter = v;
        self
    }
    pub fn background(mut self, v: [u8; 4]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
