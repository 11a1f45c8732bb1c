//! RiskMap CLI - environmental suitability (malaria risk) index

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use riskmap_algorithms::suitability::{
    composite, normalize, RiskConfig, Variable, WeightPolicy, Weights,
};
use riskmap_cli::pipeline::classify;
use riskmap_cli::{load_config, run, RunSummary, SceneCatalogSource};
use riskmap_colormap::{raster_to_rgba, ColormapParams, Legend};
use riskmap_core::io::{read_geotiff, write_geotiff, write_rgba_tiff, GeoTiffOptions};
use riskmap_core::{Raster, RasterStatistics};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "riskmap")]
#[command(author, version, about = "Composite environmental suitability index", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from a YAML configuration
    Run {
        /// Run configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Map a raw layer to [0, 1] suitability
    Normalize {
        /// Input raster file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Value mapped to 0
        #[arg(long, allow_hyphen_values = true)]
        min: f64,
        /// Value mapped to 1
        #[arg(long, allow_hyphen_values = true)]
        max: f64,
    },
    /// Weighted sum of three suitability layers
    Composite {
        /// Temperature suitability raster
        #[arg(long)]
        temperature: PathBuf,
        /// Vegetation suitability raster
        #[arg(long)]
        vegetation: PathBuf,
        /// Rainfall suitability raster
        #[arg(long)]
        rainfall: PathBuf,
        /// Output file
        output: PathBuf,
        /// Weights as temperature,vegetation,rainfall
        #[arg(short, long, default_value = "0.4,0.3,0.3")]
        weights: String,
        /// Warn instead of failing on weights outside [0,1] or not summing to 1
        #[arg(long)]
        lenient: bool,
    },
    /// Legend class numbers (1..n) of an index raster
    Classify {
        /// Input index raster
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// YAML legend (default: the four risk classes)
        #[arg(short, long)]
        legend: Option<PathBuf>,
    },
    /// Render an index raster to an RGBA TIFF
    Preview {
        /// Input index raster
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Use flat legend colors instead of the continuous ramp
        #[arg(long)]
        classes: bool,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Print the default legend and model configuration
    Legend,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path, None)
        .with_context(|| format!("Failed to read raster {:?}", path))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn write_result(raster: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    let options = GeoTiffOptions {
        write_nodata_tag: true,
    };
    write_geotiff(raster, path, Some(options)).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_weights(s: &str) -> Result<Weights> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid weights: {}", s))?;
    match parts.as_slice() {
        [t, v, r] => Ok(Weights::new(*t, *v, *r)),
        _ => anyhow::bail!(
            "Weights must be 'temperature,vegetation,rainfall', got: {}",
            s
        ),
    }
}

fn load_legend(path: Option<&Path>) -> Result<Legend> {
    let Some(path) = path else {
        return Ok(Legend::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read legend from {:?}", path))?;
    let legend: Legend = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse legend from {:?}", path))?;
    legend.validate()?;
    Ok(legend)
}

fn print_statistics(stats: &RasterStatistics<f64>, cells: usize) {
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / cells.max(1) as f64
    );
}

fn print_summary(summary: &RunSummary, legend: &Legend) {
    let index = &summary.assessment.index;

    for warning in &summary.assessment.warnings {
        println!("Warning: {}", warning);
    }
    for path in &summary.written {
        println!("Saved: {}", path.display());
    }

    println!("\nIndex statistics:");
    print_statistics(&summary.statistics, index.len());

    println!("\n{}", legend.render_text().trim_end());
    let valid = summary.statistics.valid_count.max(1) as f64;
    for (class, count) in legend.classes.iter().zip(&summary.class_counts) {
        println!(
            "  {:<16} {:>10} cells ({:.1}%)",
            class.label,
            count,
            100.0 * *count as f64 / valid
        );
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Run { config } => {
            let config = load_config(&config)?;
            let source = SceneCatalogSource::new(config.layers.clone());

            let pb = spinner("Computing risk index...");
            let start = Instant::now();
            let summary = run(&config, &source);
            pb.finish_and_clear();
            let summary = summary?;

            print_summary(&summary, &config.legend);
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Normalize {
            input,
            output,
            min,
            max,
        } => {
            let raster = read_raster(&input)?;
            let start = Instant::now();
            let result = normalize(&raster, min, max).context("Failed to normalize")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("Suitability", &output, elapsed);
        }

        Commands::Composite {
            temperature,
            vegetation,
            rainfall,
            output,
            weights,
            lenient,
        } => {
            let weights = parse_weights(&weights)?;
            let policy = if lenient {
                WeightPolicy::Lenient
            } else {
                WeightPolicy::Strict
            };
            let t = read_raster(&temperature)?;
            let v = read_raster(&vegetation)?;
            let r = read_raster(&rainfall)?;
            let start = Instant::now();
            let result =
                composite(&t, &v, &r, &weights, policy).context("Failed to composite")?;
            let elapsed = start.elapsed();
            if !result.has_valid_data() {
                warn!("composite index has no valid cells");
            }
            write_result(&result, &output)?;
            done("Risk index", &output, elapsed);
        }

        Commands::Classify {
            input,
            output,
            legend,
        } => {
            let legend = load_legend(legend.as_deref())?;
            let raster = read_raster(&input)?;
            let start = Instant::now();
            let result = classify(&raster, &legend).context("Failed to classify")?;
            let elapsed = start.elapsed();
            write_result(&result, &output)?;
            done("Risk classes", &output, elapsed);
        }

        Commands::Preview {
            input,
            output,
            classes,
        } => {
            let raster = read_raster(&input)?;
            let params = if classes {
                ColormapParams::classes(Legend::default())
            } else {
                ColormapParams::ramp()
            };
            let start = Instant::now();
            let rgba = raster_to_rgba(&raster, &params);
            let elapsed = start.elapsed();
            write_rgba_tiff(&rgba, raster.rows(), raster.cols(), &output)
                .context("Failed to write preview")?;
            done("Preview", &output, elapsed);
        }

        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            print_statistics(&raster.statistics(), raster.len());
        }

        Commands::Legend => {
            println!("{}", Legend::default().render_text());

            let config = RiskConfig::default();
            println!("Suitability bands:");
            for variable in Variable::ALL {
                let band = config.band(variable);
                println!(
                    "  {:<12} [{}, {}] {}  weight {}",
                    variable.name(),
                    band.min(),
                    band.max(),
                    variable.unit(),
                    config.weights.get(variable)
                );
            }
            println!("\nDefault configuration (YAML):");
            print!(
                "{}",
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?
            );
        }
    }

    Ok(())
}
