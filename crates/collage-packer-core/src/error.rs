use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollageError {
    /// An input could not be read or decoded. Aborts the whole run.
    #[error("failed to decode `{source_id}`: {source}")]
    Decode {
        source_id: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Unknown image source: {0}")]
    UnknownSource(String),
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Image `{source_id}` has zero area ({width}x{height})")]
    InvalidItem {
        source_id: String,
        width: u32,
        height: u32,
    },
    #[error("Nothing to pack")]
    Empty,
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, CollageError>;
