// Configuration for an evolution run

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, Result};
use crate::genes::{Canvas, Color};

/// Parameters controlling the evolution process
///
/// Every field can be set from a TOML file; missing fields fall back to
/// [`EvolutionParams::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Number of individuals per generation (M)
    pub population_size: usize,

    /// Number of triangles per genome (N)
    pub genome_length: usize,

    /// Independent per-gene replacement probability, in `[0, 1]`
    pub mutation_rate: f64,

    /// Samples drawn per tournament (K)
    pub tournament_size: usize,

    /// Suggested pause between steps for the host; the engine never sleeps
    pub step_interval_ms: u64,

    /// Color every render starts from
    pub background: Color,

    /// Seed for the random source; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            canvas_width: 200,
            canvas_height: 200,
            population_size: 50,
            genome_length: 50,
            mutation_rate: 0.01,
            tournament_size: 5,
            step_interval_ms: 100,
            background: Color::BLACK,
            seed: None,
        }
    }
}

impl EvolutionParams {
    /// Reject settings the engine can't run with
    ///
    /// Values are never clamped: a bad value is an error.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(EvolutionError::InvalidConfiguration(msg.to_string()));

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return invalid("canvas width and height must be at least 1");
        }
        if self.population_size == 0 {
            return invalid("population size must be at least 1");
        }
        if self.genome_length == 0 {
            return invalid("genome length must be at least 1");
        }
        if self.tournament_size == 0 {
            return invalid("tournament size must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation rate must be between 0 and 1");
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas_width, self.canvas_height)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Parse and validate parameters from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let params: Self = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
