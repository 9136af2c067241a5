use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Canvas, Color, Point};
use crate::palette::Palette;

/// A single gene: three vertices and one flat color
///
/// Fields are private so a triangle can't be edited after creation.
/// Mutation swaps in a whole new triangle instead of nudging a vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    points: [Point; 3],
    color: Color,
}

impl Triangle {
    pub fn new(points: [Point; 3], color: Color) -> Self {
        Self { points, color }
    }

    /// Create a uniformly random triangle
    ///
    /// Each vertex is drawn independently from `[0, width) × [0, height)` and
    /// the color is picked uniformly from `palette`.
    ///
    /// Draw order is fixed (x then y for each vertex, then the color) so a
    /// seeded generator always yields the same triangle.
    pub fn random<R: Rng + ?Sized>(canvas: Canvas, palette: &Palette, rng: &mut R) -> Self {
        let width = canvas.width as f32;
        let height = canvas.height as f32;

        let points = {
            let mut vertex = || Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
            [vertex(), vertex(), vertex()]
        };

        Self {
            points,
            color: palette.choose(rng),
        }
    }

    pub fn points(&self) -> &[Point; 3] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }
}
