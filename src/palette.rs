// Candidate colors for random and mutated triangles

use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, Result};
use crate::genes::Color;

/// Non-empty, read-only list of colors sampled from the target
///
/// Duplicates are kept on purpose: a color that covers half the target shows up
/// in half the entries, so uniform picks favour dominant colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// # Errors
    /// Returns `EmptyPalette` if `colors` is empty.
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            return Err(EvolutionError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Sample every pixel of `image` in row-major order
    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        let colors = image.pixels().map(|&p| Color::from(p)).collect();
        Self::new(colors)
    }

    /// Pick one color uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        self.colors[rng.gen_range(0..self.colors.len())]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    // Always false, kept so clippy's len_without_is_empty stays quiet
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = EvolutionError;

    fn try_from(colors: Vec<Color>) -> Result<Self> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(EvolutionError::EmptyPalette)));
    }

    #[test]
    fn test_from_image_samples_every_pixel() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        img.put_pixel(2, 1, Rgba([9, 9, 9, 128]));

        let palette = Palette::from_image(&img).unwrap();
        assert_eq!(palette.len(), 6);
        assert_eq!(palette.colors()[0], Color::rgba(1, 2, 3, 255));
        assert_eq!(palette.colors()[5], Color::rgba(9, 9, 9, 128));
    }

    #[test]
    fn test_from_empty_image_fails() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(Palette::from_image(&img), Err(EvolutionError::EmptyPalette)));
    }

    #[test]
    fn test_choose_covers_all_entries() {
        let colors = vec![
            Color::rgba(255, 0, 0, 255),
            Color::rgba(0, 255, 0, 255),
            Color::rgba(0, 0, 255, 255),
        ];
        let palette = Palette::new(colors.clone()).unwrap();
        let mut rng = Pcg64::seed_from_u64(11);

        let mut seen = [false; 3];
        for _ in 0..300 {
            let c = palette.choose(&mut rng);
            let idx = colors.iter().position(|&x| x == c).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<Palette>("[]").is_err());
        let palette: Palette = serde_json::from_str(r#"[{"r":1,"g":2,"b":3,"a":4}]"#).unwrap();
        assert_eq!(palette.colors(), &[Color::rgba(1, 2, 3, 4)]);
    }
}
