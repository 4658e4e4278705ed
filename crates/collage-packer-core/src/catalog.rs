use crate::error::{CollageError, Result};
use crate::source::ImageSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Metadata for one candidate image, taken from its header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub source_id: String,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}

impl Item {
    /// Rejects zero-area images.
    pub fn new(source_id: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let source_id = source_id.into();
        if width == 0 || height == 0 {
            return Err(CollageError::InvalidItem {
                source_id,
                width,
                height,
            });
        }
        Ok(Self {
            source_id,
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Items still waiting for a place on the canvas, ascending by area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Sorts ascending by area; equal areas are ordered by source id.
    pub fn from_items(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| {
            a.area()
                .cmp(&b.area())
                .then_with(|| a.source_id.cmp(&b.source_id))
        });
        Self { items }
    }

    /// Probes every id in `ids` sequentially. The first unreadable input aborts the build.
    pub fn build<S, I>(source: &S, ids: &[I]) -> Result<Self>
    where
        S: ImageSource + ?Sized,
        I: AsRef<str>,
    {
        let items = ids
            .iter()
            .map(|id| probe_item(source, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_items(items))
    }

    /// Like [`Catalog::build`], probing on the rayon pool. The result is identical
    /// because the catalog is sorted after probing.
    #[cfg(feature = "parallel")]
    pub fn build_parallel<S, I>(source: &S, ids: &[I]) -> Result<Self>
    where
        S: ImageSource + ?Sized,
        I: AsRef<str> + Sync,
    {
        let items = ids
            .par_iter()
            .map(|id| probe_item(source, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_items(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, idx: usize) -> Option<&Item> {
        self.items.get(idx)
    }

    /// Takes the item at `idx` out of the catalog, keeping the order of the rest.
    pub fn remove(&mut self, idx: usize) -> Item {
        self.items.remove(idx)
    }

    pub fn total_area(&self) -> u64 {
        self.items.iter().map(Item::area).sum()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

fn probe_item<S: ImageSource + ?Sized>(source: &S, id: &str) -> Result<Item> {
    let (w, h) = source.probe(id)?;
    debug!(id, w, h, "probed");
    Item::new(id, w, h)
}
