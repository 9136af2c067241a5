// Populations of scored genomes
//
// Evaluation is the expensive part of every generation, so it is the one
// place that fans out over rayon's thread pool.

use image::RgbaImage;
use rand::Rng;
// par_iter() and map_init() for evaluating individuals on every core
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// Import the building blocks from the rest of the crate
use crate::error::Result;
use crate::fitness::pixel_distance;
use crate::genes::{Canvas, Genome};
use crate::painting::Rasterizer;
use crate::palette::Palette;

/// One candidate solution: a genome and, once evaluated, its score
///
/// `fitness` is `None` for anything freshly created, crossed over or mutated.
/// Touching the genome through [`Individual::genome_mut`] clears it again, so
/// a stale score can never outlive the genome it was computed for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual {
    /// The triangles this candidate paints, in paint order
    genome: Genome,

    /// Summed RGB distance to the target, lower is better
    /// Private so only evaluation inside the crate can set it
    fitness: Option<u64>,
}

impl Individual {
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: None,
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Mutable access to the genome; invalidates the fitness
    pub fn genome_mut(&mut self) -> &mut Genome {
        self.fitness = None;
        &mut self.genome
    }

    /// Lower is better; `None` until evaluated
    pub fn fitness(&self) -> Option<u64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub(crate) fn set_fitness(&mut self, fitness: u64) {
        self.fitness = Some(fitness);
    }
}

/// Fixed-size set of individuals making up one generation
pub struct Population {
    /// Always exactly the configured population size
    individuals: Vec<Individual>,

    /// Generation these individuals belong to (starts at 0)
    generation: usize,
}

impl Population {
    /// Create `size` individuals with random genomes
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        genome_length: usize,
        canvas: Canvas,
        palette: &Palette,
        rng: &mut R,
    ) -> Self {
        let individuals = (0..size)
            .map(|_| Individual::new(Genome::random(genome_length, canvas, palette, rng)))
            .collect();

        Self {
            individuals,
            generation: 0,
        }
    }

    pub fn from_individuals(individuals: Vec<Individual>, generation: usize) -> Self {
        Self {
            individuals,
            generation,
        }
    }

    /// Render and score every individual against `target`
    ///
    /// Work is spread over rayon's pool with one scratch buffer per worker, so
    /// nothing is allocated per individual. Scores are collected before any
    /// of them is written back: if one evaluation fails, the population is left
    /// exactly as it was.
    ///
    /// # Errors
    /// `DimensionMismatch` if `canvas` and `target` disagree on size.
    pub fn evaluate<Z: Rasterizer + ?Sized>(
        &mut self,
        rasterizer: &Z,
        target: &RgbaImage,
        canvas: Canvas,
    ) -> Result<()> {
        let scores = self
            .individuals
            .par_iter()
            .map_init(
                || RgbaImage::new(canvas.width, canvas.height),
                |scratch, individual| {
                    rasterizer.render_into(individual.genome(), scratch);
                    pixel_distance(scratch, target)
                },
            )
            .collect::<Result<Vec<u64>>>()?;

        for (individual, score) in self.individuals.iter_mut().zip(scores) {
            individual.set_fitness(score);
        }
        Ok(())
    }

    /// Sort ascending by fitness, best first
    ///
    /// The sort is stable, so equal scores keep their previous relative order.
    ///
    /// # Panics
    /// Panics if any individual hasn't been evaluated.
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by_key(|i| {
            i.fitness()
                .expect("population must be evaluated before sorting")
        });
    }

    /// The individual with the lowest score (first one on ties)
    ///
    /// # Panics
    /// Panics if the population is empty or hasn't been evaluated.
    pub fn best(&self) -> &Individual {
        self.individuals
            .iter()
            .min_by_key(|i| {
                i.fitness()
                    .expect("population must be evaluated before picking the best")
            })
            .expect("population is empty")
    }

    /// Mean score across the population
    ///
    /// # Panics
    /// Panics if any individual hasn't been evaluated.
    pub fn average_fitness(&self) -> f64 {
        let sum: f64 = self
            .individuals
            .iter()
            .map(|i| i.fitness().expect("population must be evaluated") as f64)
            .sum();

        sum / self.individuals.len() as f64
    }

    pub fn is_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}
