use super::partition::{AreaOrder, PartitionSet};
use super::region::Region;
use crate::catalog::{Catalog, Item};
use crate::config::{PackerConfig, RatioMetric, SplitOrientation};
use crate::error::Result;
use crate::model::{FitKind, Pass, Placement, Rect};
use crate::resample::{cover_size, thumbnail_size};
use tracing::{debug, trace};

/// Where the engine is in its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Native-size first fit; `cursor` indexes the shrinking catalog.
    FirstFit { cursor: usize },
    /// Largest region first, best aspect-ratio match, forced downscale.
    RatioMatch,
    /// Either the free regions or the catalog ran out.
    Done,
}

/// Decides where every catalog item goes.
///
/// The engine owns the free list and the catalog and yields one [`Placement`] per
/// call to `next`. Decisions are geometry only; pixels are the caller's business, so
/// the same engine drives both full compositing and layout-only runs.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    partitions: PartitionSet,
    catalog: Catalog,
    stage: Stage,
    split: SplitOrientation,
    near_fit_margin: u32,
    ratio_metric: RatioMetric,
}

impl PlacementEngine {
    pub fn new(cfg: &PackerConfig, catalog: Catalog) -> Result<Self> {
        cfg.validate()?;
        let mut partitions =
            PartitionSet::new(cfg.canvas_width, cfg.canvas_height, cfg.sliver_tolerance);
        partitions.sort(AreaOrder::Ascending);
        Ok(Self {
            partitions,
            catalog,
            stage: Stage::FirstFit { cursor: 0 },
            split: cfg.split,
            near_fit_margin: cfg.near_fit_margin,
            ratio_metric: cfg.ratio_metric,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn partitions(&self) -> &PartitionSet {
        &self.partitions
    }

    /// Items not placed yet.
    pub fn remaining(&self) -> &Catalog {
        &self.catalog
    }

    /// Items that were never placed. Meaningful once the engine is exhausted.
    pub fn into_remaining(self) -> Catalog {
        self.catalog
    }

    fn first_fit(&mut self, cursor: usize) -> Option<Placement> {
        let item = &self.catalog.items()[cursor];
        match self.partitions.first_fit(item.width, item.height) {
            Some(region_idx) => {
                let region = self.partitions.regions()[region_idx];
                let native = (item.width, item.height);
                let (scaled, fit) = self.top_up(item, native, FitKind::Native, &region);
                // the catalog shrinks, so the cursor stays put
                Some(self.commit(region_idx, cursor, scaled, Pass::FirstFit, fit))
            }
            None => {
                trace!(id = %item.source_id, "no fitting region, deferred");
                self.stage = Stage::FirstFit { cursor: cursor + 1 };
                None
            }
        }
    }

    fn ratio_match(&mut self) -> Option<Placement> {
        let region = self.partitions.regions()[0];
        let item_idx = self.best_match(&region);
        let item = &self.catalog.items()[item_idx];
        let thumb = thumbnail_size(item.width, item.height, region.width(), region.height());
        let fit = if thumb == (item.width, item.height) {
            FitKind::Native
        } else {
            FitKind::Thumbnail
        };
        let (scaled, fit) = self.top_up(item, thumb, fit, &region);
        Some(self.commit(0, item_idx, scaled, Pass::RatioMatch, fit))
    }

    /// Index of the remaining item scoring lowest against `region`; ties keep catalog order.
    fn best_match(&self, region: &Region) -> usize {
        let mut best_idx = 0;
        let mut best_score = f64::INFINITY;
        for (i, item) in self.catalog.items().iter().enumerate() {
            let s = score(self.ratio_metric, item, region);
            if s < best_score {
                best_score = s;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Near-fit rule: when both leftover margins are under the tolerance, scale the
    /// source up to cover the region so no sliver is left behind.
    fn top_up(
        &self,
        item: &Item,
        size: (u32, u32),
        fit: FitKind,
        region: &Region,
    ) -> ((u32, u32), FitKind) {
        let (rw, rh) = (region.width(), region.height());
        let margin_w = rw.saturating_sub(size.0);
        let margin_h = rh.saturating_sub(size.1);
        if margin_w >= self.near_fit_margin || margin_h >= self.near_fit_margin {
            return (size, fit);
        }
        if margin_w == 0 && margin_h == 0 {
            return (size, fit);
        }
        let covered = cover_size(item.width, item.height, rw, rh);
        trace!(id = %item.source_id, ?size, ?covered, "near-fit top-up");
        (covered, FitKind::TopUp)
    }

    fn commit(
        &mut self,
        region_idx: usize,
        item_idx: usize,
        scaled: (u32, u32),
        pass: Pass,
        fit: FitKind,
    ) -> Placement {
        let item = self.catalog.remove(item_idx);
        let region = self.partitions.regions()[region_idx];
        let frame = Rect::new(
            region.top_left().x,
            region.top_left().y,
            scaled.0.min(region.width()),
            scaled.1.min(region.height()),
        );
        self.partitions.occupy(region_idx, frame.w, frame.h, self.split);
        debug!(
            id = %item.source_id,
            ?pass,
            ?fit,
            x = frame.x,
            y = frame.y,
            w = frame.w,
            h = frame.h,
            free = self.partitions.len(),
            "placed"
        );
        Placement {
            key: item.source_id,
            region: region.to_rect(),
            frame,
            scaled,
            source_size: (item.width, item.height),
            pass,
            fit,
        }
    }
}

fn score(metric: RatioMetric, item: &Item, region: &Region) -> f64 {
    let ratio_diff = (item.aspect_ratio as f64 - region.aspect_ratio() as f64).abs();
    match metric {
        RatioMetric::AspectRatio => ratio_diff,
        RatioMetric::AspectRatioAndArea => {
            let a = item.area() as f64;
            let b = region.area() as f64;
            ratio_diff + (a - b).abs() / a.max(b)
        }
    }
}

impl Iterator for PlacementEngine {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        loop {
            match self.stage {
                Stage::FirstFit { cursor } => {
                    if cursor >= self.catalog.len() {
                        debug!(
                            deferred = self.catalog.len(),
                            free = self.partitions.len(),
                            "first-fit pass finished"
                        );
                        self.partitions.sort(AreaOrder::Descending);
                        self.stage = Stage::RatioMatch;
                        continue;
                    }
                    if let Some(p) = self.first_fit(cursor) {
                        return Some(p);
                    }
                }
                Stage::RatioMatch => {
                    if self.partitions.is_empty() || self.catalog.is_empty() {
                        debug!(
                            leftover = self.catalog.len(),
                            free = self.partitions.len(),
                            "ratio pass finished"
                        );
                        self.stage = Stage::Done;
                        continue;
                    }
                    return self.ratio_match();
                }
                Stage::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(sizes: &[(&str, u32, u32)]) -> Catalog {
        Catalog::from_items(
            sizes
                .iter()
                .map(|(k, w, h)| Item::new(*k, *w, *h).unwrap())
                .collect(),
        )
    }

    fn cfg(w: u32, h: u32) -> PackerConfig {
        PackerConfig::builder().with_canvas(w, h).build()
    }

    #[test]
    fn first_fit_keeps_cursor_after_placement() {
        let mut engine =
            PlacementEngine::new(&cfg(100, 100), catalog(&[("a", 20, 20), ("b", 30, 30)])).unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.key, "a");
        assert_eq!(engine.stage(), Stage::FirstFit { cursor: 0 });
        let p = engine.next().unwrap();
        assert_eq!(p.key, "b");
        assert_eq!(p.pass, Pass::FirstFit);
        assert!(engine.next().is_none());
        assert_eq!(engine.stage(), Stage::Done);
    }

    #[test]
    fn oversized_item_goes_to_ratio_pass() {
        let mut engine =
            PlacementEngine::new(&cfg(100, 50), catalog(&[("big", 400, 200)])).unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.pass, Pass::RatioMatch);
        assert_eq!(p.fit, FitKind::Thumbnail);
        assert_eq!(p.scaled, (100, 50));
        assert_eq!(p.frame, Rect::new(0, 0, 100, 50));
        assert!(engine.partitions().is_empty());
    }

    #[test]
    fn near_fit_tops_up_to_cover_region() {
        // 95x96 in a 100x100 canvas leaves 5/4 px margins
        let mut engine = PlacementEngine::new(&cfg(100, 100), catalog(&[("a", 95, 96)])).unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.fit, FitKind::TopUp);
        assert!(p.scaled.0 >= 100 && p.scaled.1 >= 100);
        assert_eq!(p.frame, Rect::new(0, 0, 100, 100));
        assert!(engine.partitions().is_empty());
    }

    #[test]
    fn wide_margin_disables_top_up() {
        let mut engine = PlacementEngine::new(&cfg(100, 100), catalog(&[("a", 95, 50)])).unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.fit, FitKind::Native);
        assert_eq!(p.scaled, (95, 50));
    }

    #[test]
    fn ratio_pass_prefers_closest_aspect() {
        // Canvas too small for anything at native size: the tall item must win the tall canvas.
        let mut engine = PlacementEngine::new(
            &cfg(40, 120),
            catalog(&[("wide", 400, 100), ("tall", 100, 300), ("square", 200, 200)]),
        )
        .unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.key, "tall");
        assert_eq!(p.pass, Pass::RatioMatch);
    }

    #[test]
    fn area_metric_can_change_the_choice() {
        let sizes = [("huge", 4000, 4000), ("small", 60, 50)];
        let base = PackerConfig::builder()
            .with_canvas(50, 50)
            .sliver_tolerance(5)
            .near_fit_margin(0);
        let mut by_ratio = PlacementEngine::new(&base.clone().build(), catalog(&sizes)).unwrap();
        assert_eq!(by_ratio.next().unwrap().key, "huge");
        let mut by_area = PlacementEngine::new(
            &base.ratio_metric(RatioMetric::AspectRatioAndArea).build(),
            catalog(&sizes),
        )
        .unwrap();
        assert_eq!(by_area.next().unwrap().key, "small");
    }

    #[test]
    fn ratio_pass_tops_up_near_fit_thumbnail() {
        // thumbnail is 100x98: a 2px margin on the height only
        let mut engine =
            PlacementEngine::new(&cfg(100, 100), catalog(&[("a", 1000, 980)])).unwrap();
        let p = engine.next().unwrap();
        assert_eq!(p.pass, Pass::RatioMatch);
        assert_eq!(p.fit, FitKind::TopUp);
        assert_eq!(p.scaled, (102, 100));
        assert_eq!(p.frame, p.region);
        assert_eq!(p.frame, Rect::new(0, 0, 100, 100));
        assert!(engine.next().is_none());
    }

    #[test]
    fn leftover_items_remain_in_catalog() {
        let mut engine = PlacementEngine::new(
            &cfg(50, 50),
            catalog(&[("a", 200, 200), ("b", 300, 300), ("c", 400, 400)]),
        )
        .unwrap();
        let placed: Vec<_> = engine.by_ref().collect();
        assert_eq!(placed.len(), 1);
        assert_eq!(engine.remaining().len(), 2);
    }
}
