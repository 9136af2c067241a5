use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Canvas, Triangle};
use crate::palette::Palette;

/// An ordered, fixed-length list of triangles
///
/// Order matters: the rasterizer paints triangles front to back in this order,
/// so later entries cover earlier ones. The length never changes after
/// construction; genes can only be swapped out one-for-one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    triangles: Vec<Triangle>,
}

impl Genome {
    /// Build a genome of `length` uniformly random triangles
    pub fn random<R: Rng + ?Sized>(
        length: usize,
        canvas: Canvas,
        palette: &Palette,
        rng: &mut R,
    ) -> Self {
        let triangles = (0..length)
            .map(|_| Triangle::random(canvas, palette, rng))
            .collect();

        Self { triangles }
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Replace the gene at `index`, returning the old one
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn replace(&mut self, index: usize, triangle: Triangle) -> Triangle {
        std::mem::replace(&mut self.triangles[index], triangle)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
