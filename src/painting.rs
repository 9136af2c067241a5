// Rendering genomes into pixel buffers
//
// The engine only depends on the `Rasterizer` trait. `PolygonRasterizer` is the
// stock implementation built on imageproc's polygon fill.

use image::{GrayImage, Luma, Rgba, RgbaImage};
// imageproc does the scanline fill; we only handle ordering and blending
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

// Import our gene types from the genes module
use crate::genes::{Color, Genome, Point};

/// Turns a genome into pixels
///
/// Implementations must be pure: `render_into` overwrites every pixel of the
/// buffer (background first, then triangles in genome order), so the result
/// depends only on the genome and the buffer size. That is what lets the
/// population be evaluated on many threads with one scratch buffer each.
pub trait Rasterizer: Sync {
    /// Paint `genome` onto `canvas`, using the canvas's own dimensions
    fn render_into(&self, genome: &Genome, canvas: &mut RgbaImage);

    /// Render into a freshly allocated `width × height` buffer
    fn render(&self, genome: &Genome, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        self.render_into(genome, &mut canvas);
        canvas
    }
}

/// Check if three pixel-snapped points form a degenerate triangle
///
/// Duplicate or collinear vertices enclose no area; imageproc refuses polygons
/// whose first and last points coincide, so these are skipped entirely.
fn is_degenerate(points: &[(i32, i32); 3]) -> bool {
    let (p0, p1, p2) = (points[0], points[1], points[2]);

    if p0 == p1 || p1 == p2 || p0 == p2 {
        return true;
    }

    // Cross product of the two edges from p0 gives twice the signed area;
    // zero means collinear. i64 keeps large coordinates from overflowing
    let area = (p1.0 - p0.0) as i64 * (p2.1 - p0.1) as i64
        - (p2.0 - p0.0) as i64 * (p1.1 - p0.1) as i64;
    area == 0
}

/// Flat-shaded triangle rasterizer with a fixed background
///
/// Vertices are rounded to the pixel grid. Opaque triangles replace the pixels
/// they cover; translucent ones are composited with Porter-Duff "over";
/// fully transparent ones are skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonRasterizer {
    /// Color every render starts from, before any triangle is drawn
    /// Usually opaque; a translucent background still counts as-is for RGB
    background: Color,
}

impl PolygonRasterizer {
    pub fn new(background: Color) -> Self {
        Self { background }
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

impl Default for PolygonRasterizer {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl Rasterizer for PolygonRasterizer {
    fn render_into(&self, genome: &Genome, canvas: &mut RgbaImage) {
        let background = self.background.to_rgba();
        for pixel in canvas.pixels_mut() {
            *pixel = background;
        }

        if canvas.width() == 0 || canvas.height() == 0 {
            return;
        }

        // Coverage mask for translucent triangles, allocated on first use
        let mut mask: Option<GrayImage> = None;

        for triangle in genome.triangles() {
            let snapped = (*triangle.points()).map(Point::to_pixel);
            if is_degenerate(&snapped) {
                continue;
            }

            let polygon = snapped.map(|(x, y)| PixelPoint::new(x, y));
            let color = triangle.color();

            match color.a {
                0 => {}
                255 => draw_polygon_mut(canvas, &polygon, color.to_rgba()),
                _ => {
                    let mask = mask
                        .get_or_insert_with(|| GrayImage::new(canvas.width(), canvas.height()));
                    blend_triangle(canvas, mask, &snapped, &polygon, color);
                }
            }
        }
    }
}

/// Composite a translucent triangle over the existing pixels
///
/// The triangle is first filled into `mask`, then every covered pixel inside
/// the triangle's bounding box is blended and its mask entry reset to zero, so
/// the mask is clean again for the next triangle.
fn blend_triangle(
    canvas: &mut RgbaImage,
    mask: &mut GrayImage,
    snapped: &[(i32, i32); 3],
    polygon: &[PixelPoint<i32>; 3],
    color: Color,
) {
    draw_polygon_mut(mask, polygon, Luma([255]));

    let max_x = canvas.width() as i32 - 1;
    let max_y = canvas.height() as i32 - 1;
    let clamp_x = |v: i32| v.clamp(0, max_x) as u32;
    let clamp_y = |v: i32| v.clamp(0, max_y) as u32;

    let x0 = clamp_x(snapped.iter().map(|p| p.0).min().unwrap_or(0));
    let x1 = clamp_x(snapped.iter().map(|p| p.0).max().unwrap_or(0));
    let y0 = clamp_y(snapped.iter().map(|p| p.1).min().unwrap_or(0));
    let y1 = clamp_y(snapped.iter().map(|p| p.1).max().unwrap_or(0));

    // Normalize alpha to 0.0-1.0 for the "over" operator
    let src_alpha = color.a as f32 / 255.0;
    let inv_alpha = 1.0 - src_alpha;
    let src = [color.r, color.g, color.b];

    for y in y0..=y1 {
        for x in x0..=x1 {
            if mask.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            mask.put_pixel(x, y, Luma([0]));

            let dst = canvas.get_pixel(x, y).0;
            let channel = |i: usize| {
                (src[i] as f32 * src_alpha + dst[i] as f32 * inv_alpha).round() as u8
            };
            let alpha = (color.a as f32 + dst[3] as f32 * inv_alpha).round().min(255.0) as u8;

            canvas.put_pixel(x, y, Rgba([channel(0), channel(1), channel(2), alpha]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::Triangle;

    fn triangle(points: [(f32, f32); 3], color: Color) -> Triangle {
        Triangle::new(points.map(|(x, y)| Point::new(x, y)), color)
    }

    // Covers the lower-left half of a 20x20 canvas, including pixel (2, 15)
    fn lower_left(color: Color) -> Triangle {
        triangle([(0.0, 0.0), (0.0, 19.0), (19.0, 19.0)], color)
    }

    #[test]
    fn test_empty_genome_renders_background() {
        let raster = PolygonRasterizer::new(Color::rgba(1, 2, 3, 255));
        let img = raster.render(&Genome::from_triangles(vec![]), 8, 6);

        assert_eq!(img.dimensions(), (8, 6));
        assert!(img.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_default_background_is_opaque_black() {
        assert_eq!(PolygonRasterizer::default().background(), Color::BLACK);
    }

    #[test]
    fn test_opaque_triangle_painted() {
        let red = Color::rgba(255, 0, 0, 255);
        let genome = Genome::from_triangles(vec![lower_left(red)]);
        let img = PolygonRasterizer::default().render(&genome, 20, 20);

        assert_eq!(*img.get_pixel(2, 15), Rgba([255, 0, 0, 255]));
        // Upper-right corner stays background
        assert_eq!(*img.get_pixel(18, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_later_triangles_paint_over_earlier() {
        let red = Color::rgba(255, 0, 0, 255);
        let green = Color::rgba(0, 255, 0, 255);
        let raster = PolygonRasterizer::default();

        let red_then_green = Genome::from_triangles(vec![lower_left(red), lower_left(green)]);
        let green_then_red = Genome::from_triangles(vec![lower_left(green), lower_left(red)]);

        assert_eq!(*raster.render(&red_then_green, 20, 20).get_pixel(2, 15), Rgba([0, 255, 0, 255]));
        assert_eq!(*raster.render(&green_then_red, 20, 20).get_pixel(2, 15), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_translucent_triangle_blends() {
        let half_white = Color::rgba(255, 255, 255, 128);
        let genome = Genome::from_triangles(vec![lower_left(half_white)]);
        let img = PolygonRasterizer::default().render(&genome, 20, 20);

        let p = img.get_pixel(2, 15).0;
        assert_eq!(p[0], 128);
        assert_eq!(p[1], 128);
        assert_eq!(p[2], 128);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_transparent_triangle_skipped() {
        let genome = Genome::from_triangles(vec![lower_left(Color::rgba(255, 255, 255, 0))]);
        let img = PolygonRasterizer::default().render(&genome, 20, 20);
        assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_degenerate_triangle_detection() {
        assert!(is_degenerate(&[(0, 0), (0, 0), (0, 0)]));
        assert!(is_degenerate(&[(0, 0), (5, 5), (0, 0)]));
        assert!(is_degenerate(&[(0, 0), (5, 5), (10, 10)]));
        assert!(is_degenerate(&[(0, 0), (10, 0), (5, 0)]));

        assert!(!is_degenerate(&[(0, 0), (10, 0), (5, 10)]));
        assert!(!is_degenerate(&[(100, 100), (150, 120), (120, 180)]));
    }

    #[test]
    fn test_degenerate_triangles_do_not_panic() {
        let white = Color::rgba(255, 255, 255, 255);
        let genome = Genome::from_triangles(vec![
            triangle([(5.0, 5.0), (5.1, 5.2), (4.9, 4.8)], white),
            triangle([(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)], white),
        ]);
        let img = PolygonRasterizer::default().render(&genome, 10, 10);
        assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_render_into_ignores_previous_contents() {
        let raster = PolygonRasterizer::default();
        let genome = Genome::from_triangles(vec![lower_left(Color::rgba(9, 8, 7, 200))]);

        let fresh = raster.render(&genome, 20, 20);

        let mut dirty = RgbaImage::from_pixel(20, 20, Rgba([200, 100, 50, 10]));
        raster.render_into(&genome, &mut dirty);

        assert_eq!(fresh, dirty);
    }
}
