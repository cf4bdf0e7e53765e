//! Sky chart and code stamping tool
//!
//! # Usage
//!
//! ```bash
//! # Sky chart from a projected catalog (x,y,magnitude rows)
//! cargo run --release --bin skystamp -- chart --stars projected.csv --limiting-magnitude 10
//!
//! # Noise canvas with a code image stamped at every visible star
//! cargo run --release --bin skystamp -- stamps --stars projected.csv --code code.png --seed 7
//!
//! # One code in the middle of a random canvas, with a white border
//! cargo run --release --bin skystamp -- center --code code.png --border
//! ```
//!
//! # Commands
//!
//! ## `chart`
//! - Filters stars by limiting magnitude and sizes markers by brightness
//! - Draws the navy horizon disk and clips every marker to it
//!
//! ## `stamps`
//! - Draws a noise canvas (`noiseDensity` is the share of 0 cells)
//! - Stamps the code centered on each visible star, in catalog order
//! - Stamps that would cross the canvas edge are dropped
//!
//! ## `center`
//! - Canvas side is ten times the code side, half of the cells set
//! - Stamps the code once at the center
//!
//! Every command reads defaults from `--config <json>` when given; explicit
//! flags win over the file. Set `RUST_LOG=debug` for placement details.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use skystamp::{
    render_stars, save_chart, visible_stars, Canvas, ChartConfig, CoordinateSource,
    CsvStarSource, ImagePattern, Observer, PatternGenerator, PlacementEngine, Stamp, Star,
    UniformPattern,
};

/// Share of 0 cells in the `center` background
const CENTER_NOISE_DENSITY: f64 = 0.5;
/// `center` canvas side as a multiple of the code side
const CENTER_CANVAS_SCALE: usize = 10;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (camelCase keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Observer handed to the coordinate source
#[derive(Args, Debug, Clone)]
struct ObserverArgs {
    /// Latitude in degrees
    #[arg(long, default_value_t = 47.400698, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, default_value_t = 8.512807, allow_negative_numbers = true)]
    lon: f64,

    /// Local civil time, "YYYY-MM-DD HH:MM"
    #[arg(long, default_value = "2023-06-14 12:00")]
    when: String,

    /// IANA timezone name
    #[arg(long, default_value = "Europe/Zurich")]
    timezone: String,
}

impl ObserverArgs {
    fn to_observer(&self) -> Result<Observer> {
        Observer::new(self.lat, self.lon, &self.when, &self.timezone)
            .context("Invalid observer settings")
    }
}

/// Where the stamp comes from
#[derive(Args, Debug, Clone)]
struct StampArgs {
    /// Pre-rendered code image (PNG, ...)
    #[arg(long, conflicts_with = "uniform")]
    code: Option<PathBuf>,

    /// Use a solid square of this side instead of a code image
    #[arg(long)]
    uniform: Option<usize>,

    /// Pixels per code module in the code image
    #[arg(long, default_value_t = 1)]
    module_px: u32,
}

impl StampArgs {
    fn generate(&self) -> Result<Stamp> {
        let stamp = match (&self.code, self.uniform) {
            (Some(path), _) => ImagePattern {
                module_px: self.module_px,
                ..Default::default()
            }
            .generate(&path.to_string_lossy()),
            (None, Some(size)) => UniformPattern { size, value: true }.generate(""),
            (None, None) => bail!("Either --code or --uniform is required"),
        }
        .context("Failed to build stamp")?;
        info!("Stamp is {0}x{0} cells", stamp.size());
        Ok(stamp)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render the star chart scatter plot
    Chart {
        /// Projected star catalog (x,y,magnitude)
        #[arg(long)]
        stars: PathBuf,

        #[command(flatten)]
        observer: ObserverArgs,

        /// Faintest magnitude drawn (inclusive)
        #[arg(long, allow_negative_numbers = true)]
        limiting_magnitude: Option<f64>,

        /// Marker area in points² for a magnitude-0 star
        #[arg(long)]
        max_marker_size: Option<f64>,

        /// Output PNG path
        #[arg(short, long, default_value = "sky_chart.png")]
        output: PathBuf,
    },

    /// Stamp a code at every visible star on a noise canvas
    Stamps {
        /// Projected star catalog (x,y,magnitude)
        #[arg(long)]
        stars: PathBuf,

        #[command(flatten)]
        observer: ObserverArgs,

        #[command(flatten)]
        stamp: StampArgs,

        /// Faintest magnitude stamped (inclusive)
        #[arg(long, allow_negative_numbers = true)]
        limiting_magnitude: Option<f64>,

        /// Canvas side in cells
        #[arg(long)]
        canvas_size: Option<usize>,

        /// Probability of a 0 background cell
        #[arg(long)]
        noise_density: Option<f64>,

        /// Background noise seed
        #[arg(long)]
        seed: Option<u64>,

        /// Compute stamp boxes on all cores (writes stay in catalog order)
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output PNG path
        #[arg(short, long, default_value = "star_stamps.png")]
        output: PathBuf,
    },

    /// Stamp a single code at the center of a random canvas
    Center {
        #[command(flatten)]
        stamp: StampArgs,

        /// Draw a one-cell border of 1s around the code
        #[arg(long, default_value_t = false)]
        border: bool,

        /// Background noise seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output PNG path
        #[arg(short, long, default_value = "center_code.png")]
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ChartConfig::default()),
    }
}

fn load_stars(path: &Path, observer: &ObserverArgs) -> Result<Vec<Star>> {
    let observer = observer.to_observer()?;
    let stars = CsvStarSource::new(path)
        .stars(&observer)
        .with_context(|| format!("Failed to load stars from {}", path.display()))?;
    info!("Loaded {} stars from {}", stars.len(), path.display());
    Ok(stars)
}

fn run_chart(config: &ChartConfig, stars: &[Star], output: &Path) -> Result<()> {
    let pixmap = render_stars(stars, config).context("Failed to render chart")?;
    save_chart(&pixmap, output)
        .with_context(|| format!("Failed to save chart to {}", output.display()))?;
    println!("Saved sky chart to {}", output.display());
    Ok(())
}

fn run_stamps(
    config: &ChartConfig,
    stars: &[Star],
    stamp: &Stamp,
    parallel: bool,
    output: &Path,
) -> Result<()> {
    let visible = visible_stars(stars, config.limiting_magnitude);
    info!(
        "{} of {} stars at or brighter than magnitude {}",
        visible.len(),
        stars.len(),
        config.limiting_magnitude
    );

    let mut canvas = Canvas::noise_seeded(config.canvas_size, config.noise_density, config.seed)
        .context("Failed to create noise canvas")?;
    let engine = PlacementEngine::from_config(config);

    let summary = if parallel {
        engine.place_all_parallel(&mut canvas, &visible, stamp)
    } else {
        let pb = ProgressBar::new(visible.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .context("Invalid progress bar template")?
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Embedding codes");
        let summary = engine.place_all_with(&mut canvas, &visible, stamp, |_| pb.inc(1));
        pb.finish_and_clear();
        summary
    };

    info!(
        "Placed {} stamps ({} unobservable, {} off the canvas edge)",
        summary.placed, summary.skipped_unobservable, summary.skipped_out_of_bounds
    );
    if summary.placed == 0 && summary.skipped_out_of_bounds > 0 {
        warn!(
            "No stamp fit on the canvas: {0}x{0} stamp on a {1}x{1} canvas",
            stamp.size(),
            canvas.size()
        );
    }

    canvas
        .save_png(output)
        .with_context(|| format!("Failed to save canvas to {}", output.display()))?;
    println!("Saved stamp field to {}", output.display());
    Ok(())
}

fn run_center(stamp: &Stamp, border: bool, seed: Option<u64>, output: &Path) -> Result<()> {
    let canvas_size = stamp.size() * CENTER_CANVAS_SCALE;
    let mut canvas = Canvas::noise_seeded(canvas_size, CENTER_NOISE_DENSITY, seed)
        .context("Failed to create noise canvas")?;
    let engine = PlacementEngine::default();

    if border {
        let frame = Stamp::uniform(stamp.size() + 2, true)?;
        engine.place_centered(&mut canvas, &frame);
    }
    let outcome = engine.place_centered(&mut canvas, stamp);
    if !outcome.is_placed() {
        bail!("Code did not fit on the {canvas_size}x{canvas_size} canvas");
    }

    canvas
        .save_png(output)
        .with_context(|| format!("Failed to save canvas to {}", output.display()))?;
    println!("Saved centered code to {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chart {
            stars,
            observer,
            limiting_magnitude,
            max_marker_size,
            output,
        } => {
            if let Some(limit) = limiting_magnitude {
                config.limiting_magnitude = limit;
            }
            if let Some(size) = max_marker_size {
                config.max_marker_size = size;
            }
            config.validate()?;
            let stars = load_stars(&stars, &observer)?;
            run_chart(&config, &stars, &output)
        }

        Commands::Stamps {
            stars,
            observer,
            stamp,
            limiting_magnitude,
            canvas_size,
            noise_density,
            seed,
            parallel,
            output,
        } => {
            if let Some(limit) = limiting_magnitude {
                config.limiting_magnitude = limit;
            }
            if let Some(size) = canvas_size {
                config.canvas_size = size;
            }
            if let Some(density) = noise_density {
                config.noise_density = density;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            config.validate()?;
            let stamp = stamp.generate()?;
            let stars = load_stars(&stars, &observer)?;
            run_stamps(&config, &stars, &stamp, parallel, &output)
        }

        Commands::Center {
            stamp,
            border,
            seed,
            output,
        } => {
            let stamp = stamp.generate()?;
            run_center(&stamp, border, seed.or(config.seed), &output)
        }
    }
}
