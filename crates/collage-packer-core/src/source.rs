use crate::error::{CollageError, Result};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::collections::HashMap;

/// Where images come from. `probe` must be cheap (header only) since every input is
/// probed up front; `load` is called once per placed image.
pub trait ImageSource: Send + Sync {
    /// Native `(width, height)` of `id`.
    fn probe(&self, id: &str) -> Result<(u32, u32)>;
    /// Fully decoded RGBA pixels of `id`.
    fn load(&self, id: &str) -> Result<RgbaImage>;
}

fn decode_err(id: &str, source: image::ImageError) -> CollageError {
    CollageError::Decode {
        source_id: id.to_string(),
        source,
    }
}

/// Reads images from the filesystem; ids are paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FsSource {
    fn reader(id: &str) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
        ImageReader::open(id)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| decode_err(id, image::ImageError::IoError(e)))
    }
}

impl ImageSource for FsSource {
    fn probe(&self, id: &str) -> Result<(u32, u32)> {
        Self::reader(id)?
            .into_dimensions()
            .map_err(|e| decode_err(id, e))
    }

    fn load(&self, id: &str) -> Result<RgbaImage> {
        let img = Self::reader(id)?.decode().map_err(|e| decode_err(id, e))?;
        Ok(img.to_rgba8())
    }
}

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Already-decoded images keyed by name.
#[derive(Default)]
pub struct MemorySource {
    images: HashMap<String, DynamicImage>,
    order: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, image: DynamicImage) {
        let key = key.into();
        if self.images.insert(key.clone(), image).is_none() {
            self.order.push(key);
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn get(&self, id: &str) -> Result<&DynamicImage> {
        self.images
            .get(id)
            .ok_or_else(|| CollageError::UnknownSource(id.to_string()))
    }
}

impl FromIterator<InputImage> for MemorySource {
    fn from_iter<T: IntoIterator<Item = InputImage>>(iter: T) -> Self {
        let mut src = MemorySource::new();
        for input in iter {
            src.insert(input.key, input.image);
        }
        src
    }
}

impl ImageSource for MemorySource {
    fn probe(&self, id: &str) -> Result<(u32, u32)> {
        let img = self.get(id)?;
        Ok((img.width(), img.height()))
    }

    fn load(&self, id: &str) -> Result<RgbaImage> {
        Ok(self.get(id)?.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_keeps_first_insertion_order() {
        let mut src = MemorySource::new();
        src.insert("b", DynamicImage::new_rgba8(2, 3));
        src.insert("a", DynamicImage::new_rgba8(4, 5));
        src.insert("b", DynamicImage::new_rgba8(6, 7));
        assert_eq!(src.keys(), &["b".to_string(), "a".to_string()]);
        assert_eq!(src.probe("b").unwrap(), (6, 7));
        assert_eq!(src.load("a").unwrap().dimensions(), (4, 5));
    }

    #[test]
    fn unknown_key_is_an_error() {
        let src = MemorySource::new();
        assert!(matches!(
            src.probe("missing"),
            Err(CollageError::UnknownSource(k)) if k == "missing"
        ));
    }

    #[test]
    fn fs_source_reports_the_failing_path() {
        let err = FsSource.probe("/definitely/not/here.png").unwrap_err();
        match err {
            CollageError::Decode { source_id, .. } => assert_eq!(source_id, "/definitely/not/here.png"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }
}
