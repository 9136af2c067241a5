// Loading the image to approximate

use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{EvolutionError, Result};
use crate::genes::Canvas;

/// Open an image file and scale it to exactly fill `canvas`
///
/// Any failure (missing file, unreadable or unsupported data) is reported as
/// `TargetUnavailable`; nothing about the engine is touched.
pub fn load_target(path: impl AsRef<Path>, canvas: Canvas) -> Result<RgbaImage> {
    let path = path.as_ref();
    let unavailable = |reason: String| EvolutionError::TargetUnavailable {
        source_name: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Err(unavailable("file not found".to_string()));
    }

    let image = image::open(path).map_err(|e| unavailable(e.to_string()))?;
    Ok(fit_to_canvas(&image.to_rgba8(), canvas))
}

/// Resize `image` to the canvas dimensions, ignoring aspect ratio
pub fn fit_to_canvas(image: &RgbaImage, canvas: Canvas) -> RgbaImage {
    if image.dimensions() == canvas.dimensions() {
        return image.clone();
    }
    image::imageops::resize(image, canvas.width, canvas.height, FilterType::Triangle)
}
