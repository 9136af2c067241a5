// Crossover and mutation operators

use rand::Rng;

use crate::genes::{Canvas, Genome, Triangle};
use crate::palette::Palette;
use crate::population::Individual;

/// Single-point crossover at a fixed index
///
/// Genes before `point` come from `first`, genes from `point` on come from
/// `second`. Genes never move between indices.
///
/// # Panics
/// Panics if the parents differ in length or `point` is past the end.
pub fn crossover_at(first: &Genome, second: &Genome, point: usize) -> Genome {
    assert_eq!(first.len(), second.len(), "parents must have the same genome length");
    assert!(point <= first.len(), "crossover point out of range");

    let triangles = first.triangles()[..point]
        .iter()
        .chain(&second.triangles()[point..])
        .cloned()
        .collect();

    Genome::from_triangles(triangles)
}

/// Breed two parents with a uniformly random crossover point in `[0, N)`
///
/// The child starts unevaluated.
pub fn crossover<R: Rng + ?Sized>(
    first: &Individual,
    second: &Individual,
    rng: &mut R,
) -> Individual {
    let point = rng.gen_range(0..first.genome().len());
    Individual::new(crossover_at(first.genome(), second.genome(), point))
}

/// Replace each gene with a fresh random triangle with probability `rate`
///
/// Every gene gets its own independent draw. Returns how many genes were
/// replaced; if any were, the individual's fitness is cleared.
pub fn mutate<R: Rng + ?Sized>(
    individual: &mut Individual,
    palette: &Palette,
    rate: f64,
    canvas: Canvas,
    rng: &mut R,
) -> usize {
    let len = individual.genome().len();
    let mut replaced = 0;

    for index in 0..len {
        if rng.gen_bool(rate) {
            let fresh = Triangle::random(canvas, palette, rng);
            individual.genome_mut().replace(index, fresh);
            replaced += 1;
        }
    }

    replaced
}
