// Pixel-wise distance between a rendered candidate and the target

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{EvolutionError, Result};

fn check_dimensions(candidate: &RgbaImage, target: &RgbaImage) -> Result<()> {
    if candidate.dimensions() != target.dimensions() {
        return Err(EvolutionError::DimensionMismatch {
            expected: target.dimensions(),
            actual: candidate.dimensions(),
        });
    }
    Ok(())
}

/// Sum of absolute RGB differences over raw RGBA bytes
///
/// Alpha (every fourth byte) is ignored.
fn rgb_distance(candidate: &[u8], target: &[u8]) -> u64 {
    candidate
        .chunks_exact(4)
        .zip(target.chunks_exact(4))
        .map(|(c, t)| {
            let dr = c[0].abs_diff(t[0]) as u64;
            let dg = c[1].abs_diff(t[1]) as u64;
            let db = c[2].abs_diff(t[2]) as u64;
            dr + dg + db
        })
        .sum()
}

/// Total absolute RGB difference between two images (lower is better)
///
/// `Σ |R_t − R_c| + |G_t − G_c| + |B_t − B_c|` over every pixel. The result is
/// `0` exactly when every pixel's RGB matches, and never exceeds
/// [`max_distance`].
///
/// # Errors
/// Returns `DimensionMismatch` if the images differ in size.
pub fn pixel_distance(candidate: &RgbaImage, target: &RgbaImage) -> Result<u64> {
    check_dimensions(candidate, target)?;
    Ok(rgb_distance(candidate.as_raw(), target.as_raw()))
}

/// Parallel version of [`pixel_distance`], split by rows
///
/// Worth it for a single large image. During population evaluation the
/// individuals are already spread across threads, so the engine uses the
/// sequential version there.
pub fn pixel_distance_parallel(candidate: &RgbaImage, target: &RgbaImage) -> Result<u64> {
    check_dimensions(candidate, target)?;

    let row_bytes = (candidate.width() as usize * 4).max(1);
    let total: u64 = candidate
        .as_raw()
        .par_chunks(row_bytes)
        .zip(target.as_raw().par_chunks(row_bytes))
        .map(|(c, t)| rgb_distance(c, t))
        .sum();

    Ok(total)
}

/// Largest possible score for a `width × height` image
pub fn max_distance(width: u32, height: u32) -> u64 {
    3 * 255 * width as u64 * height as u64
}
