use super::region::Region;
use crate::config::SplitOrientation;
use tracing::trace;

/// Sort order of the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaOrder {
    Ascending,
    Descending,
}

/// All currently unoccupied canvas area as a list of disjoint regions.
///
/// The list is kept sorted by area in `order`; ties keep insertion order.
#[derive(Debug, Clone)]
pub struct PartitionSet {
    regions: Vec<Region>,
    order: AreaOrder,
    tolerance: u32,
}

impl PartitionSet {
    /// A set holding one region spanning the whole canvas.
    pub fn new(width: u32, height: u32, tolerance: u32) -> Self {
        Self {
            regions: vec![Region::canvas(width, height)],
            order: AreaOrder::Ascending,
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, idx: usize) -> Option<&Region> {
        self.regions.get(idx)
    }

    pub fn order(&self) -> AreaOrder {
        self.order
    }

    /// Stable re-sort by area.
    pub fn sort(&mut self, order: AreaOrder) {
        self.order = order;
        match order {
            AreaOrder::Ascending => self.regions.sort_by_key(|r| r.area()),
            AreaOrder::Descending => self.regions.sort_by(|a, b| b.area().cmp(&a.area())),
        }
    }

    /// Appends `region` if it passes the sliver tolerance. Does not re-sort.
    pub fn insert(&mut self, region: Region) -> bool {
        if region.is_valid(self.tolerance) {
            self.regions.push(region);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, idx: usize) -> Region {
        self.regions.remove(idx)
    }

    /// Index of the first region, in current order, that holds `width` x `height`.
    pub fn first_fit(&self, width: u32, height: u32) -> Option<usize> {
        self.regions.iter().position(|r| r.big_enough(width, height))
    }

    /// Consumes the region at `idx` with a `width` x `height` footprint at its top-left,
    /// inserts the valid split children and re-sorts. Returns the consumed region.
    pub fn occupy(
        &mut self,
        idx: usize,
        width: u32,
        height: u32,
        orientation: SplitOrientation,
    ) -> Region {
        let region = self.remove(idx);
        let (a, b) = region.split(width, height, orientation);
        let kept_a = self.insert(a);
        let kept_b = self.insert(b);
        trace!(
            ?region,
            width,
            height,
            kept_a,
            kept_b,
            free = self.regions.len(),
            "split region"
        );
        self.sort(self.order);
        region
    }

    /// Total free area.
    pub fn free_area(&self) -> u64 {
        self.regions.iter().map(|r| r.area()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    #[test]
    fn starts_with_canvas_region() {
        let set = PartitionSet::new(100, 50, 10);
        assert_eq!(set.len(), 1);
        assert_eq!(set.regions()[0].to_rect(), Rect::new(0, 0, 100, 50));
        assert_eq!(set.free_area(), 5000);
    }

    #[test]
    fn insert_rejects_slivers() {
        let mut set = PartitionSet::new(100, 100, 10);
        assert!(!set.insert(Region::from(Rect::new(0, 0, 10, 80))));
        assert!(set.insert(Region::from(Rect::new(0, 0, 11, 11))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut set = PartitionSet::new(100, 100, 0);
        set.remove(0);
        set.insert(Region::from(Rect::new(0, 0, 20, 10)));
        set.insert(Region::from(Rect::new(50, 0, 10, 20)));
        set.insert(Region::from(Rect::new(0, 50, 5, 5)));
        set.sort(AreaOrder::Ascending);
        let xs: Vec<u32> = set.regions().iter().map(|r| r.top_left().x).collect();
        assert_eq!(xs, vec![0, 0, 50]);
        assert_eq!(set.regions()[1].width(), 20);

        set.sort(AreaOrder::Descending);
        assert_eq!(set.regions()[0].width(), 20);
        assert_eq!(set.regions()[1].width(), 10);
        assert_eq!(set.regions()[2].width(), 5);
    }

    #[test]
    fn occupy_replaces_region_with_children() {
        let mut set = PartitionSet::new(100, 100, 0);
        let used = set.occupy(0, 60, 60, SplitOrientation::VerticalMajor);
        assert_eq!(used.to_rect(), Rect::new(0, 0, 100, 100));
        // ascending: 60x40 (2400) before 40x100 (4000)
        assert_eq!(set.regions()[0].to_rect(), Rect::new(0, 60, 60, 40));
        assert_eq!(set.regions()[1].to_rect(), Rect::new(60, 0, 40, 100));
        assert_eq!(set.free_area(), 10000 - 3600);
    }

    #[test]
    fn first_fit_scans_in_current_order() {
        let mut set = PartitionSet::new(100, 100, 0);
        set.occupy(0, 60, 60, SplitOrientation::VerticalMajor);
        assert_eq!(set.first_fit(30, 30), Some(0));
        assert_eq!(set.first_fit(30, 50), Some(1));
        assert_eq!(set.first_fit(70, 10), None);
    }
}
