//! grindpix: coffee grind particle analysis from the command line.
//!
//! Loads an image of grounds on a light background, segments the
//! particles and prints the calibrated size distribution.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use grindpix_algorithms::{
    analyze, binarize, otsu_threshold, AnalysisConfig, ThresholdMode, Weighting,
};
use grindpix_core::{
    AnalysisOutcome, AnalysisResult, Calibration, CalibrationSource, GrindType, GrindVerdict,
};
use grindpix_io::{load_grayscale, write_result_json, ResultWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    GrindpixIo(#[from] grindpix_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] grindpix_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Brew method selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grind {
    /// Turkish / ibrik
    Turkish,
    /// Espresso
    Espresso,
    /// Pour-over (V60, Kalita)
    PourOver,
    /// Batch filter
    Filter,
    /// French press
    FrenchPress,
    /// Cold brew
    ColdBrew,
}

impl From<Grind> for GrindType {
    fn from(grind: Grind) -> Self {
        match grind {
            Grind::Turkish => GrindType::Turkish,
            Grind::Espresso => GrindType::Espresso,
            Grind::PourOver => GrindType::PourOver,
            Grind::Filter => GrindType::Filter,
            Grind::FrenchPress => GrindType::FrenchPress,
            Grind::ColdBrew => GrindType::ColdBrew,
        }
    }
}

/// Statistic weighting selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeightBy {
    /// One per particle
    Count,
    /// Pixel area
    Area,
    /// Equivalent-sphere volume
    Volume,
}

impl From<WeightBy> for Weighting {
    fn from(weight: WeightBy) -> Self {
        match weight {
            WeightBy::Count => Weighting::Count,
            WeightBy::Area => Weighting::Area,
            WeightBy::Volume => Weighting::Volume,
        }
    }
}

/// Coffee grind particle-size analyzer.
#[derive(Parser)]
#[command(name = "grindpix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for particle measurement (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an image and print the size distribution
    #[command(group(
        ArgGroup::new("calibration")
            .required(true)
            .args(["microns_per_pixel", "reference_diameter_um"])
    ))]
    Analyze {
        /// Input image
        input: PathBuf,

        /// Fixed calibration factor
        #[arg(long)]
        microns_per_pixel: Option<f64>,

        /// Diameter of a round reference object in the frame (um)
        #[arg(long)]
        reference_diameter_um: Option<f64>,

        /// Minimum circularity of the reference object
        #[arg(long, default_value = "0.8")]
        reference_min_circularity: f64,

        /// Fixed binarization threshold (0-255)
        #[arg(long, conflicts_with = "otsu")]
        threshold: Option<u8>,

        /// Choose the threshold automatically (Otsu)
        #[arg(long)]
        otsu: bool,

        /// Minimum particle size in pixels
        #[arg(long, default_value = "10")]
        min_particle_pixels: usize,

        /// Maximum particle size in pixels
        #[arg(long)]
        max_particle_pixels: Option<usize>,

        /// Histogram bin count
        #[arg(long, default_value = "20")]
        bins: usize,

        /// Weighting for mean, deviation and histogram
        #[arg(long, value_enum, default_value = "area")]
        weight_by: WeightBy,

        /// Grade the result against a brew method
        #[arg(short, long, value_enum)]
        grind: Option<Grind>,

        /// Write the full result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the particle table as CSV
        #[arg(long)]
        particles: Option<PathBuf>,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show information about an image
    Info {
        /// Input image
        input: PathBuf,
    },

    /// Benchmark the analysis pipeline
    Benchmark {
        /// Input image
        input: PathBuf,

        /// Calibration factor
        #[arg(long, default_value = "10.0")]
        microns_per_pixel: f64,

        /// Number of iterations
        #[arg(short, long, default_value = "3")]
        iterations: usize,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Analyze {
            input,
            microns_per_pixel,
            reference_diameter_um,
            reference_min_circularity,
            threshold,
            otsu,
            min_particle_pixels,
            max_particle_pixels,
            bins,
            weight_by,
            grind,
            output,
            particles,
            json,
        } => {
            let source = match (microns_per_pixel, reference_diameter_um) {
                (Some(mpp), _) => CalibrationSource::Fixed(Calibration::new(mpp)?),
                (None, Some(known_diameter_um)) => CalibrationSource::Reference {
                    known_diameter_um,
                    min_circularity: reference_min_circularity,
                },
                (None, None) => {
                    return Err(grindpix_core::Error::InvalidCalibration(
                        "no calibration given".to_string(),
                    )
                    .into())
                }
            };

            let threshold = match (otsu, threshold) {
                (true, _) => ThresholdMode::Otsu,
                (false, Some(t)) => ThresholdMode::Fixed(t),
                (false, None) => ThresholdMode::default(),
            };

            let mut config = AnalysisConfig::new()
                .with_threshold(threshold)
                .with_min_particle_pixels(min_particle_pixels)
                .with_histogram_bins(bins)
                .with_weighting(weight_by.into());
            if let Some(max) = max_particle_pixels {
                config = config.with_max_particle_pixels(max);
            }

            let image = load_grayscale(&input)?;
            log::info!(
                "analyzing {} ({}x{})",
                input.display(),
                image.width(),
                image.height()
            );

            let outcome = analyze(&image, &source, &config)?;
            if outcome.is_empty() {
                log::warn!("no particles detected in {}", input.display());
            }
            let result = outcome.result();

            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print_summary(&input, &outcome);
            }

            if let Some(grind) = grind {
                print_assessment(GrindType::from(grind), result);
            }

            if let Some(path) = output {
                write_result_json(&path, result)?;
                eprintln!("Result written to: {}", path.display());
            }

            if let Some(path) = particles {
                ResultWriter::create(&path)?.write_particles_csv(&result.particles)?;
                eprintln!("Particles written to: {}", path.display());
            }
        }

        Commands::Info { input } => {
            let image = load_grayscale(&input)?;
            let threshold = otsu_threshold(&image);
            let mask = binarize(&image, threshold);

            println!("File: {}", input.display());
            println!("Dimensions: {} x {}", image.width(), image.height());
            println!("Pixels: {}", image.as_raw().len());

            if let (Some(min), Some(max)) =
                (image.as_raw().iter().min(), image.as_raw().iter().max())
            {
                println!("Intensity range: {} - {}", min, max);
            }
            println!("Otsu threshold: {}", threshold);
            println!(
                "Foreground at Otsu: {:.2}%",
                mask.foreground_fraction() * 100.0
            );
        }

        Commands::Benchmark {
            input,
            microns_per_pixel,
            iterations,
        } => {
            let image = load_grayscale(&input)?;
            let source = CalibrationSource::Fixed(Calibration::new(microns_per_pixel)?);
            let iterations = iterations.max(1);

            println!(
                "Benchmarking {}x{} image, {} iterations, {} threads",
                image.width(),
                image.height(),
                iterations,
                rayon::current_num_threads()
            );
            println!(
                "{:<12} | {:<15} | {:<15} | {:<15}",
                "Mode", "Mean Time (ms)", "Min Time (ms)", "Max Time (ms)"
            );
            println!("{:-<65}", "");

            for (parallel, name) in [(false, "Sequential"), (true, "Parallel")] {
                let config = AnalysisConfig::new().with_parallel(parallel);

                // Warmup
                let particles = analyze(&image, &source, &config)?.result().particle_count;

                let mut times = Vec::with_capacity(iterations);
                for _ in 0..iterations {
                    let start = Instant::now();
                    analyze(&image, &source, &config)?;
                    times.push(start.elapsed().as_secs_f64() * 1000.0);
                }

                let min_time = times.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max_time = times.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mean_time = times.iter().sum::<f64>() / times.len() as f64;

                println!(
                    "{:<12} | {:<15.2} | {:<15.2} | {:<15.2}",
                    name, mean_time, min_time, max_time
                );
                log::debug!("{}: {} particles", name, particles);
            }
        }
    }

    Ok(())
}

fn print_summary(input: &Path, outcome: &AnalysisOutcome) {
    let result = outcome.result();
    let d = &result.distribution;

    println!("File: {}", input.display());
    println!("Calibration: {:.4} um/px", result.microns_per_pixel);
    println!("Particles: {}", result.particle_count);
    if outcome.is_empty() {
        println!("No particles detected.");
        return;
    }

    println!(
        "D10 / D50 / D90: {:.1} / {:.1} / {:.1} um",
        d.d10, d.d50, d.d90
    );
    println!("Span: {:.3}", d.span);
    println!("Uniformity: {:.1}%", result.uniformity_score);
    println!(
        "Mean: {:.1} um (weighted {:.1} +/- {:.1} um)",
        result.average_size, d.weighted_mean, d.weighted_std_dev
    );
    println!(
        "Size range: {:.1} - {:.1} um (std dev {:.1} um)",
        result.min_size, result.max_size, result.std_dev_size
    );
    println!("Fines: {:.1}%", result.fines_percentage);
    println!("Coarse: {:.1}%", result.coarse_percentage);
    println!("Extraction efficiency: {:.1}%", d.extraction.efficiency());
    println!("Confidence: {:.1}%", result.confidence);
    println!(
        "Processing time: {:.2?}",
        result.processing_duration
    );

    println!();
    println!("{:<14} | {:>8} | {:>8}", "Category", "Count", "Share");
    println!("{:-<36}", "");
    for share in &result.size_distribution {
        println!(
            "{:<14} | {:>8} | {:>7.1}%",
            share.category.label(),
            share.count,
            share.percentage
        );
    }
}

fn print_assessment(grind: GrindType, result: &AnalysisResult) {
    let assessment = grind.profile().assess(result);
    let profile = assessment.profile;
    println!();
    println!(
        "Target for {}: {:.0} - {:.0} um, fines <= {:.0}%",
        grind, profile.target_min_um, profile.target_max_um, profile.max_fines_percent
    );
    let verdict = match assessment.verdict {
        GrindVerdict::NoData => "no particles to grade",
        GrindVerdict::TooFine => "too fine, grind coarser",
        GrindVerdict::InRange => "in range",
        GrindVerdict::TooCoarse => "too coarse, grind finer",
    };
    println!("Median: {}", verdict);
    println!(
        "Fines: {}",
        if assessment.fines_acceptable {
            "acceptable"
        } else {
            "too many"
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_requires_calibration() {
        assert!(Cli::try_parse_from(["grindpix", "analyze", "grounds.png"]).is_err());
        assert!(Cli::try_parse_from([
            "grindpix",
            "analyze",
            "grounds.png",
            "--microns-per-pixel",
            "12.5"
        ])
        .is_ok());
    }

    #[test]
    fn test_threshold_conflicts_with_otsu() {
        let parsed = Cli::try_parse_from([
            "grindpix",
            "analyze",
            "grounds.png",
            "--microns-per-pixel",
            "12.5",
            "--threshold",
            "100",
            "--otsu",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_grind_maps_to_core() {
        let cli = Cli::try_parse_from([
            "grindpix",
            "-v",
            "analyze",
            "grounds.png",
            "--reference-diameter-um",
            "24260",
            "--grind",
            "french-press",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Analyze {
            grind,
            reference_diameter_um,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(reference_diameter_um, Some(24260.0));
        assert_eq!(grind.map(GrindType::from), Some(GrindType::FrenchPress));
    }
}
