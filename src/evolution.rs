// The generation loop and its lifecycle
//
// `EvolutionLoop` owns everything a run needs: parameters, rasterizer, random
// source, target, palette and the current population. A host drives it by
// calling `step()` on whatever schedule it likes; the loop never sleeps or
// spawns timers itself.

use std::time::Duration;

use image::RgbaImage;
use log::{debug, info, warn};
// Pcg64 is the default generator so a seed reproduces the whole run
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

// Import the operators that make up one generation
use crate::config::EvolutionParams;
use crate::error::{EvolutionError, Result};
use crate::genes::Genome;
use crate::painting::{PolygonRasterizer, Rasterizer};
use crate::palette::Palette;
use crate::population::Population;
use crate::reproduction::{crossover, mutate};
use crate::selection::tournament;

/// Lifecycle of an [`EvolutionLoop`]
///
/// ```text
/// Uninitialized --load--> Idle --begin--> Running <--pause/resume--> Paused
///        any state --terminate--> Terminated
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No target or palette yet
    Uninitialized,
    /// Target and palette loaded, no population yet
    Idle,
    Running,
    Paused,
    /// Torn down; no further operations are allowed
    Terminated,
}

/// What one generation produced
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Index of the generation that was evaluated (the first one is 0)
    pub generation: usize,

    /// Score of the best individual (0 means a pixel-perfect match)
    pub best_fitness: u64,

    /// Average score across the whole population
    pub mean_fitness: f64,

    /// Copy of the winning genome, safe to keep after the population moves on
    pub best_genome: Genome,

    /// The best genome rendered at canvas size
    pub best_image: RgbaImage,
}

/// Target, palette and population of a loaded run
struct Run {
    /// Must match the canvas size, otherwise every step fails
    target: RgbaImage,
    palette: Palette,

    /// `None` between `load` and `begin`
    population: Option<Population>,
}

/// Generational GA driver with start/step/pause/resume semantics
///
/// Generic over the rasterizer (so tests and hosts can swap the renderer) and
/// over the random source (so runs can be seeded and replayed).
pub struct EvolutionLoop<Z = PolygonRasterizer, R = Pcg64> {
    /// Validated once at construction and again before every start
    params: EvolutionParams,
    rasterizer: Z,

    /// The only source of randomness in a run
    rng: R,
    state: LoopState,

    /// Everything tied to the current target; dropped on terminate
    run: Option<Run>,

    /// Most recent successful step, cleared by load and terminate
    latest: Option<GenerationReport>,
}

impl EvolutionLoop<PolygonRasterizer, Pcg64> {
    /// Build a loop with the stock rasterizer and a PCG generator
    ///
    /// The generator is seeded from `params.seed`, or from OS entropy when no
    /// seed is set.
    pub fn from_params(params: EvolutionParams) -> Result<Self> {
        let rng = match params.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let rasterizer = PolygonRasterizer::new(params.background);
        Self::new(params, rasterizer, rng)
    }
}

impl<Z: Rasterizer, R: Rng> EvolutionLoop<Z, R> {
    /// # Errors
    /// `InvalidConfiguration` if `params` fails validation.
    pub fn new(params: EvolutionParams, rasterizer: Z, rng: R) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            rasterizer,
            rng,
            state: LoopState::Uninitialized,
            run: None,
            latest: None,
        })
    }

    fn ensure_not_terminated(&self, operation: &'static str) -> Result<()> {
        if self.state == LoopState::Terminated {
            return Err(EvolutionError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Store a target and palette, discarding any existing population
    ///
    /// Moves to `Idle`. Allowed from every state except `Terminated`.
    pub fn load(&mut self, target: RgbaImage, palette: Palette) -> Result<()> {
        self.ensure_not_terminated("load")?;

        info!(
            "Loaded {}x{} target with {} palette entries",
            target.width(),
            target.height(),
            palette.len()
        );

        self.run = Some(Run {
            target,
            palette,
            population: None,
        });
        self.latest = None;
        self.state = LoopState::Idle;
        Ok(())
    }

    /// Create the initial random population and start running
    ///
    /// Only valid from `Idle`. The generation counter starts at 0.
    pub fn begin(&mut self) -> Result<()> {
        self.params.validate()?;

        let run = match (self.state, self.run.as_mut()) {
            (LoopState::Idle, Some(run)) => run,
            (state, _) => {
                return Err(EvolutionError::InvalidState {
                    operation: "begin",
                    state,
                })
            }
        };

        let population = Population::random(
            self.params.population_size,
            self.params.genome_length,
            self.params.canvas(),
            &run.palette,
            &mut self.rng,
        );
        run.population = Some(population);
        self.state = LoopState::Running;

        info!(
            "Started evolution: {} individuals x {} triangles, mutation rate {}, tournament size {}",
            self.params.population_size,
            self.params.genome_length,
            self.params.mutation_rate,
            self.params.tournament_size
        );
        Ok(())
    }

    /// Load `target` and `palette`, create a population and start running
    ///
    /// Validation happens before anything is touched, so a failed start
    /// leaves the loop in its previous state.
    pub fn start(&mut self, target: RgbaImage, palette: Palette) -> Result<()> {
        self.ensure_not_terminated("start")?;
        self.params.validate()?;
        self.load(target, palette)?;
        self.begin()
    }

    /// Run one full generation
    ///
    /// 1. Render and score every individual (in parallel)
    /// 2. Sort ascending by fitness
    /// 3. Report the best individual
    /// 4. Breed a complete replacement population by tournament selection,
    ///    crossover and mutation
    /// 5. Advance the generation counter
    ///
    /// If scoring fails the error is returned and the population and
    /// generation counter keep their pre-step values, so the call can be
    /// retried.
    pub fn step(&mut self) -> Result<GenerationReport> {
        let run = match (self.state, self.run.as_mut()) {
            (LoopState::Running, Some(run)) => run,
            (state, _) => {
                return Err(EvolutionError::InvalidState {
                    operation: "step",
                    state,
                })
            }
        };
        let Some(population) = run.population.as_mut() else {
            return Err(EvolutionError::InvalidState {
                operation: "step",
                state: self.state,
            });
        };

        let canvas = self.params.canvas();

        // Step 1: evaluation is all-or-nothing
        if let Err(e) = population.evaluate(&self.rasterizer, &run.target, canvas) {
            warn!("Generation {} aborted: {}", population.generation(), e);
            return Err(e);
        }

        // Step 2
        population.sort_by_fitness();

        // Step 3
        let best = population.best();
        let report = GenerationReport {
            generation: population.generation(),
            best_fitness: best.fitness().unwrap_or_default(),
            mean_fitness: population.average_fitness(),
            best_genome: best.genome().clone(),
            best_image: self
                .rasterizer
                .render(best.genome(), canvas.width, canvas.height),
        };

        // Step 4: no elitism, every slot is a fresh offspring
        let size = self.params.population_size;
        let mut offspring = Vec::with_capacity(size);
        let mut mutations = 0;
        while offspring.len() < size {
            let first = tournament(population.individuals(), self.params.tournament_size, &mut self.rng);
            let second = tournament(population.individuals(), self.params.tournament_size, &mut self.rng);
            let mut child = crossover(first, second, &mut self.rng);
            mutations += mutate(
                &mut child,
                &run.palette,
                self.params.mutation_rate,
                canvas,
                &mut self.rng,
            );
            offspring.push(child);
        }

        // Step 5
        *population = Population::from_individuals(offspring, report.generation + 1);

        debug!(
            "Generation {}: best {}, mean {:.1}, {} genes mutated",
            report.generation, report.best_fitness, report.mean_fitness, mutations
        );

        self.latest = Some(report.clone());
        Ok(report)
    }

    /// Stop stepping; population and generation are kept as they are
    ///
    /// Calling it while already paused is a no-op.
    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            LoopState::Running => {
                self.state = LoopState::Paused;
                info!("Paused at generation {}", self.generation());
                Ok(())
            }
            LoopState::Paused => Ok(()),
            state => Err(EvolutionError::InvalidState {
                operation: "pause",
                state,
            }),
        }
    }

    /// Continue from the retained state; the next step produces the next
    /// generation, not a fresh population
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            LoopState::Paused => {
                self.state = LoopState::Running;
                info!("Resumed at generation {}", self.generation());
                Ok(())
            }
            LoopState::Running => Ok(()),
            state => Err(EvolutionError::InvalidState {
                operation: "resume",
                state,
            }),
        }
    }

    /// Release target, palette, population and the last report; no further
    /// steps are possible
    pub fn terminate(&mut self) {
        if self.state != LoopState::Terminated {
            info!("Terminated after {} generations", self.generation());
        }
        self.run = None;
        self.latest = None;
        self.state = LoopState::Terminated;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Index of the next generation to be evaluated (0 before any step)
    pub fn generation(&self) -> usize {
        self.population().map_or(0, Population::generation)
    }

    pub fn population(&self) -> Option<&Population> {
        self.run.as_ref().and_then(|run| run.population.as_ref())
    }

    pub fn target(&self) -> Option<&RgbaImage> {
        self.run.as_ref().map(|run| &run.target)
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.run.as_ref().map(|run| &run.palette)
    }

    /// Report from the most recent successful step
    pub fn latest(&self) -> Option<&GenerationReport> {
        self.latest.as_ref()
    }

    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Scheduling hint for hosts: how long to wait between steps
    pub fn step_interval(&self) -> Duration {
        self.params.step_interval()
    }
}
