// Library root for the triangle evolver
//
// A population of genomes (ordered lists of flat-colored triangles) is evolved
// toward a target image with a generational genetic algorithm: tournament
// selection, single-point crossover and per-gene replacement mutation.
//
// Module layout, leaves first:
// - genes: points, colors, triangles and genomes
// - palette: colors sampled from the target
// - painting: the `Rasterizer` trait and the stock polygon rasterizer
// - fitness: pixel distance between a render and the target
// - population: individuals and whole generations
// - selection / reproduction: the genetic operators
// - evolution: the step/pause/resume loop tying it together

pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod genes;
pub mod painting;
pub mod palette;
pub mod population;
pub mod reproduction;
pub mod selection;
pub mod target;

// Re-export commonly used types at the library root so users can write
//   use triangle_evolver::EvolutionLoop;
pub use config::EvolutionParams;
pub use error::{EvolutionError, Result};
pub use evolution::{EvolutionLoop, GenerationReport, LoopState};
pub use genes::{Canvas, Color, Genome, Point, Triangle};
pub use painting::{PolygonRasterizer, Rasterizer};
pub use palette::Palette;
pub use population::{Individual, Population};
