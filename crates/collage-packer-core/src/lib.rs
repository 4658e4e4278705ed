//! Core library for composing many images into one fixed-size canvas.
//!
//! - Engine: two passes over a guillotine free list. Pass 1 places images at native
//!   size into the smallest region that holds them; pass 2 matches the largest
//!   remaining regions with the closest aspect ratio and downscales to fit.
//! - Pipeline: `build_catalog` probes headers, `pack` decides and composites,
//!   `export_canvas` writes the raster.
//! - Data model is serde-serializable; `pack_layout` computes geometry without pixels.
//!
//! Quick example:
//! ```ignore
//! use collage_packer_core::{FsSource, PackerConfig, build_catalog, export_canvas, pack};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = PackerConfig::builder().with_canvas(1920, 1080).build();
//! let paths = vec!["a.png".to_string(), "b.jpg".to_string()];
//! let catalog = build_catalog(&FsSource, &paths, &cfg)?;
//! let out = pack(&cfg, catalog, &FsSource)?;
//! println!("{}", out.stats().summary());
//! export_canvas(&out.canvas, "collage.png")?;
//! # Ok(()) }
//! ```

pub mod catalog;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod resample;
pub mod source;

pub use catalog::*;
pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use source::*;

/// Convenience prelude for common types and functions.
/// Importing `collage_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::catalog::{Catalog, Item};
    pub use crate::compositing::Canvas;
    pub use crate::config::{
        PackerConfig, PackerConfigBuilder, RatioMetric, ResizeFilter, SplitOrientation,
    };
    pub use crate::model::{FitKind, Layout, PackStats, Pass, Placement, Point, Rect};
    pub use crate::packer::{PlacementEngine, Region, Stage};
    pub use crate::source::{FsSource, ImageSource, InputImage, MemorySource};
    pub use crate::{
        PackOutput, build_catalog, export_canvas, pack, pack_images, pack_layout,
        pack_with_observer, to_json,
    };
}
