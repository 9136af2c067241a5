// Command-line host for the triangle evolver
//
// Loads a target image, extracts its palette, then drives the evolution loop
// one generation at a time, saving the best painting as it goes.

// CLI parsing, progress display and logging
use clap::Parser;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

// The engine itself lives in the library crate
use triangle_evolver::target::load_target;
use triangle_evolver::{EvolutionLoop, EvolutionParams, GenerationReport, Palette};

use std::fs;
use std::path::{Path, PathBuf};

/// Triangle Evolver - approximate an image with evolving colored triangles
///
/// Every generation renders each candidate, scores it against the target,
/// and breeds a new population by tournament selection, single-point
/// crossover and mutation.
#[derive(Parser)]
#[command(name = "triangle-evolver")]
#[command(about = "Evolve triangle paintings toward a target image", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the target image (PNG, JPEG, etc.)
    #[arg(short, long)]
    input: PathBuf,

    /// TOML file with evolution parameters; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas width in pixels (the target is scaled to fit)
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Number of individuals per generation
    #[arg(short, long)]
    population: Option<usize>,

    /// Number of triangles per genome
    #[arg(short = 'n', long)]
    triangles: Option<usize>,

    /// Per-triangle replacement probability (0.0-1.0)
    #[arg(long)]
    mutation_rate: Option<f64>,

    /// Individuals sampled per tournament
    #[arg(short = 'k', long)]
    tournament_size: Option<usize>,

    /// Milliseconds to wait between generations
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generations to run
    #[arg(short, long, default_value_t = 1000)]
    generations: usize,

    /// Output directory for generated images
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Save the best painting every N generations
    #[arg(long, default_value_t = 50)]
    save_interval: usize,

    /// Number of threads for parallel evaluation (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    fn params(&self) -> Result<EvolutionParams, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => EvolutionParams::from_toml_file(path)?,
            None => EvolutionParams::default(),
        };

        if let Some(v) = self.width {
            params.canvas_width = v;
        }
        if let Some(v) = self.height {
            params.canvas_height = v;
        }
        if let Some(v) = self.population {
            params.population_size = v;
        }
        if let Some(v) = self.triangles {
            params.genome_length = v;
        }
        if let Some(v) = self.mutation_rate {
            params.mutation_rate = v;
        }
        if let Some(v) = self.tournament_size {
            params.tournament_size = v;
        }
        if let Some(v) = self.interval_ms {
            params.step_interval_ms = v;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }

        params.validate()?;
        Ok(params)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        info!("Using {} thread(s) for evaluation", num_threads);
    }

    let params = args.params()?;
    fs::create_dir_all(&args.output)?;

    info!("Loading target image: {}", args.input.display());
    let target = load_target(&args.input, params.canvas())?;
    let palette = Palette::from_image(&target)?;

    info!(
        "Canvas {}x{}, population {}, {} triangles, mutation rate {}, tournament size {}",
        params.canvas_width,
        params.canvas_height,
        params.population_size,
        params.genome_length,
        params.mutation_rate,
        params.tournament_size
    );

    // Scaled target goes next to the paintings for side-by-side comparison
    save_target(&target, &args.output)?;

    let mut evo = EvolutionLoop::from_params(params)?;
    evo.start(target, palette)?;

    let pb = ProgressBar::new(args.generations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} (ETA: {eta}) | {msg}")?
            .progress_chars("=>-"),
    );

    let interval = evo.step_interval();
    let save_interval = args.save_interval.max(1);

    for _ in 0..args.generations {
        let report = evo.step()?;

        pb.set_message(format!(
            "Best: {}, Mean: {:.0}",
            report.best_fitness, report.mean_fitness
        ));
        pb.inc(1);

        if report.generation % save_interval == 0 {
            save_report(&report, &args.output)?;
        }

        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    pb.finish_with_message("Evolution complete");

    // Freeze the population while the final artifacts are written
    evo.pause()?;

    if let Some(best) = evo.latest() {
        save_report(best, &args.output)?;
        let genome_path = args.output.join("best_genome.json");
        fs::write(&genome_path, serde_json::to_string_pretty(&best.best_genome)?)?;

        info!(
            "Final fitness {} after {} generations, written to {}",
            best.best_fitness,
            evo.generation(),
            args.output.display()
        );
    }

    evo.terminate();
    Ok(())
}

/// Save the best painting of a generation, plus a copy as latest.png
fn save_report(report: &GenerationReport, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let filename = output_dir.join(format!("generation_{:05}.png", report.generation));
    report.best_image.save(&filename)?;
    report.best_image.save(output_dir.join("latest.png"))?;
    Ok(())
}

/// Save the canvas-sized target as target.png
fn save_target(target: &RgbaImage, output_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = output_dir.join("target.png");
    target.save(&path)?;
    info!("Scaled target written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_save_target_writes_scaled_copy() {
        let dir = std::env::temp_dir().join("triangle_evolver_cli_target");
        fs::create_dir_all(&dir).unwrap();
        let target = RgbaImage::from_pixel(12, 9, Rgba([40, 80, 120, 255]));

        let path = save_target(&target, &dir).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(path.file_name().unwrap(), "target.png");
        assert_eq!(reloaded, target);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "triangle-evolver",
            "--input",
            "in.png",
            "--width",
            "64",
            "--population",
            "8",
            "--seed",
            "3",
        ]);
        let params = args.params().unwrap();

        assert_eq!(params.canvas_width, 64);
        assert_eq!(params.canvas_height, EvolutionParams::default().canvas_height);
        assert_eq!(params.population_size, 8);
        assert_eq!(params.seed, Some(3));
    }
}
