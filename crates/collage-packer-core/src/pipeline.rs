use crate::catalog::{Catalog, Item};
use crate::compositing::Canvas;
use crate::config::PackerConfig;
use crate::error::{CollageError, Result};
use crate::model::{Layout, PackStats, Placement};
use crate::packer::PlacementEngine;
use crate::resample::resample;
use crate::source::{ImageSource, InputImage, MemorySource};
use tracing::{info, instrument, warn};

/// Output of a packing run: the composited canvas and its geometry.
pub struct PackOutput {
    pub canvas: Canvas,
    pub layout: Layout,
}

impl PackOutput {
    /// Computes coverage statistics for this output.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> PackStats {
        self.layout.stats()
    }
}

/// Probes `ids` through `source` and returns the catalog sorted ascending by area.
///
/// With `cfg.parallel` and the `parallel` feature, headers are probed on the rayon
/// pool; the resulting catalog is the same either way.
#[instrument(skip_all, fields(inputs = ids.len()))]
pub fn build_catalog<S, I>(source: &S, ids: &[I], cfg: &PackerConfig) -> Result<Catalog>
where
    S: ImageSource + ?Sized,
    I: AsRef<str> + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return Catalog::build_parallel(source, ids);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = cfg;
    Catalog::build(source, ids)
}

/// Packs `catalog` onto a `cfg.canvas_width` x `cfg.canvas_height` canvas, loading
/// pixels from `source` as each placement is decided.
///
/// Notes:
/// - Placement is sequential; every decision sees the free list left by the previous one.
/// - A decode failure aborts the run.
/// - Items left over when free space runs out are listed in `layout.dropped`.
#[instrument(skip_all)]
pub fn pack<S>(cfg: &PackerConfig, catalog: Catalog, source: &S) -> Result<PackOutput>
where
    S: ImageSource + ?Sized,
{
    pack_with_observer(cfg, catalog, source, |_| {})
}

/// Same as [`pack`], calling `observer` after each image is composited.
pub fn pack_with_observer<S, F>(
    cfg: &PackerConfig,
    catalog: Catalog,
    source: &S,
    mut observer: F,
) -> Result<PackOutput>
where
    S: ImageSource + ?Sized,
    F: FnMut(&Placement),
{
    if catalog.is_empty() {
        return Err(CollageError::Empty);
    }
    let mut engine = PlacementEngine::new(cfg, catalog)?;
    let mut canvas = Canvas::new(cfg.canvas_width, cfg.canvas_height, cfg.background);
    let mut placements = Vec::new();

    for placement in engine.by_ref() {
        let src = source.load(&placement.key)?;
        let (w, h) = placement.scaled;
        let img = resample(&src, w, h, cfg.filter);
        canvas.blit(&img, placement.region);
        if cfg.outlines {
            canvas.outline(placement.frame);
        }
        observer(&placement);
        placements.push(placement);
    }

    let layout = finish(cfg, placements, engine);
    Ok(PackOutput { canvas, layout })
}

/// Packs in-memory images. Convenience over [`build_catalog`] + [`pack`].
pub fn pack_images(inputs: Vec<InputImage>, cfg: PackerConfig) -> Result<PackOutput> {
    if inputs.is_empty() {
        return Err(CollageError::Empty);
    }
    let source: MemorySource = inputs.into_iter().collect();
    let catalog = build_catalog(&source, source.keys(), &cfg)?;
    pack(&cfg, catalog, &source)
}

/// Layout-only packing: `(key, width, height)` triples in, placements out, no pixels.
/// Produces the same geometry as [`pack`] for images of those sizes.
pub fn pack_layout<K: Into<String>>(sizes: Vec<(K, u32, u32)>, cfg: PackerConfig) -> Result<Layout> {
    if sizes.is_empty() {
        return Err(CollageError::Empty);
    }
    let items = sizes
        .into_iter()
        .map(|(k, w, h)| Item::new(k, w, h))
        .collect::<Result<Vec<_>>>()?;
    pack_catalog_layout(&cfg, Catalog::from_items(items))
}

/// Runs the engine over an already built catalog without touching pixels.
pub fn pack_catalog_layout(cfg: &PackerConfig, catalog: Catalog) -> Result<Layout> {
    if catalog.is_empty() {
        return Err(CollageError::Empty);
    }
    let mut engine = PlacementEngine::new(cfg, catalog)?;
    let placements: Vec<Placement> = engine.by_ref().collect();
    Ok(finish(cfg, placements, engine))
}

fn finish(cfg: &PackerConfig, placements: Vec<Placement>, engine: PlacementEngine) -> Layout {
    let dropped: Vec<String> = engine
        .into_remaining()
        .into_items()
        .into_iter()
        .map(|i| i.source_id)
        .collect();
    let layout = Layout {
        width: cfg.canvas_width,
        height: cfg.canvas_height,
        placements,
        dropped,
    };
    let stats = layout.stats();
    if stats.num_dropped > 0 {
        warn!(
            dropped = stats.num_dropped,
            "canvas too small for every image; use a larger canvas to place them all"
        );
    }
    info!(
        placed = stats.num_placed,
        first_fit = stats.num_first_fit,
        ratio_match = stats.num_ratio_match,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "packing finished"
    );
    layout
}
