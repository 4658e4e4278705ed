use crate::compositing::Canvas;
use crate::error::{CollageError, Result};
use crate::model::Layout;
use image::{DynamicImage, ImageFormat};
use serde_json::{Value, json};
use std::path::Path;
use tracing::info;

/// Encodes the canvas to `path`; the format follows the file extension.
/// Formats without an alpha channel (JPEG, PNM) get the canvas flattened to RGB.
pub fn export_canvas(canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let encode_err = |source| CollageError::Encode {
        path: path.to_path_buf(),
        source,
    };
    let format = ImageFormat::from_path(path).map_err(encode_err)?;
    let saved = if matches!(format, ImageFormat::Jpeg | ImageFormat::Pnm) {
        DynamicImage::ImageRgba8(canvas.as_image().clone())
            .to_rgb8()
            .save_with_format(path, format)
    } else {
        canvas.as_image().save_with_format(path, format)
    };
    saved.map_err(encode_err)?;
    info!(path = %path.display(), ?format, w = canvas.width(), h = canvas.height(), "canvas written");
    Ok(())
}

/// Serialize the layout as `{ canvas, placements, dropped, stats }`.
/// Placement fields use camelCase to match common sprite-sheet tooling.
pub fn to_json(layout: &Layout) -> Value {
    let placements: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            let frame = json!({"x": p.frame.x, "y": p.frame.y, "w": p.frame.w, "h": p.frame.h});
            let region = json!({"x": p.region.x, "y": p.region.y, "w": p.region.w, "h": p.region.h});
            json!({
                "key": p.key,
                "frame": frame,
                "region": region,
                "scaledSize": {"w": p.scaled.0, "h": p.scaled.1},
                "sourceSize": {"w": p.source_size.0, "h": p.source_size.1},
                "pass": p.pass,
                "fit": p.fit,
            })
        })
        .collect();
    json!({
        "canvas": {"w": layout.width, "h": layout.height},
        "placements": placements,
        "dropped": layout.dropped,
        "stats": layout.stats(),
    })
}
