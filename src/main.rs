//! planetsim CLI - procedural planet surface and atmosphere simulator.
//!
//! Generates an elevation map and direct sunlight for a patch of a planet,
//! and runs a column-wise atmosphere simulation over it.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use planetsim::atmosphere::{GridSize, Windsim};
use planetsim::export::{
    elevation_preview, export_field_png, export_rgb_png, sunlight_preview, PngExportOptions,
    PreviewOptions, ProfileExportOptions, ProfileExporter,
};
use planetsim::pipeline::{AtmosphereStage, HeightmapStage, InsolationStage, Pipeline, RunOptions};

/// Procedural planet surface and atmosphere simulator.
#[derive(Parser)]
#[command(name = "planetsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// JSON file with a complete run description; flags override it.
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a world: elevation, sunlight and previews.
    Generate(GenerateArgs),
    /// Run the atmosphere simulation only, writing profile graphs and CSV.
    Windsim(WindsimArgs),
    /// Print the derived layer geometry for a configuration.
    Info(AtmosphereArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Map width in cells.
    #[arg(long)]
    width: Option<usize>,

    /// Map height in cells.
    #[arg(long)]
    height: Option<usize>,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Base name for output files.
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Chaos of the first noise octave (0.6-3.0).
    #[arg(long)]
    energy: Option<f64>,

    /// Contrast of the detail octaves (-0.5-1.0).
    #[arg(long)]
    turbulence: Option<f64>,

    /// Point in the yearly orbit (0.0-1.0) used for sunlight.
    #[arg(long)]
    orbit: Option<f64>,

    /// Width of the preview images in pixels.
    #[arg(long)]
    preview_width: Option<u32>,

    /// Also run the atmosphere simulation over the map.
    #[arg(long)]
    atmosphere: bool,

    #[command(flatten)]
    sim: AtmosphereArgs,
}

#[derive(Args)]
struct WindsimArgs {
    /// Output directory for graphs and the CSV table.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Skip the PNG graphs.
    #[arg(long)]
    no_graphs: bool,

    /// Skip the CSV table.
    #[arg(long)]
    no_csv: bool,

    #[command(flatten)]
    sim: AtmosphereArgs,
}

#[derive(Args)]
struct AtmosphereArgs {
    /// Grid size as X,Y,Z.
    #[arg(long, value_parser = parse_grid_size)]
    grid: Option<GridSize>,

    /// Atmosphere height in metres.
    #[arg(long)]
    atmosphere_height: Option<f64>,

    /// Number of iterations.
    #[arg(long)]
    iterations: Option<usize>,

    /// Snapshot every N iterations (0 disables).
    #[arg(long)]
    snapshot_interval: Option<usize>,

    /// Run columns on a single thread.
    #[arg(long)]
    sequential: bool,
}

impl AtmosphereArgs {
    fn apply(&self, options: &mut RunOptions) {
        let sim = &mut options.windsim;
        if let Some(grid) = self.grid {
            sim.size = grid;
        }
        if let Some(height) = self.atmosphere_height {
            sim.height = height;
        }
        if let Some(iterations) = self.iterations {
            sim.iterations = iterations;
        }
        if let Some(interval) = self.snapshot_interval {
            sim.snapshot_interval = interval;
        }
        if self.sequential {
            sim.parallel = false;
        }
    }
}

fn parse_grid_size(s: &str) -> Result<GridSize, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected X,Y,Z, got '{}'", s));
    }
    let mut dims = [0usize; 3];
    for (dim, part) in dims.iter_mut().zip(&parts) {
        *dim = part
            .parse()
            .map_err(|e| format!("invalid grid dimension '{}': {}", part, e))?;
    }
    let size = GridSize::new(dims[0], dims[1], dims[2]);
    size.validate().map_err(|e| e.to_string())?;
    Ok(size)
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: failed to install logger: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut options = match &cli.options {
        Some(path) => RunOptions::load(path)?,
        None => RunOptions::default(),
    };

    match cli.command {
        Commands::Generate(args) => run_generate(options, args),
        Commands::Windsim(args) => {
            args.sim.apply(&mut options);
            run_windsim(options, args)
        }
        Commands::Info(args) => {
            args.apply(&mut options);
            run_info(&options)
        }
    }
}

fn run_generate(mut options: RunOptions, args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(seed) = args.seed {
        options.heightmap.seed = seed;
    }
    if let Some(name) = args.name {
        options.name = name;
    }
    if let Some(energy) = args.energy {
        options.heightmap.energy = energy;
    }
    if let Some(turbulence) = args.turbulence {
        options.heightmap.turbulence = turbulence;
    }
    if let Some(orbit) = args.orbit {
        options.orbit = orbit;
    }
    args.sim.apply(&mut options);

    println!("planetsim - Planet Generator");
    println!("============================");
    println!("Map: {}x{} cells", options.width, options.height);
    println!("Seed: {}", options.heightmap.seed);
    println!("Output: {}", args.output.display());

    let start = Instant::now();
    let mut world = options.build_world()?;
    fs::create_dir_all(&args.output)?;

    let mut pipeline = Pipeline::new(options.stage_config());
    pipeline.add_stage(HeightmapStage).add_stage(InsolationStage);
    if args.atmosphere {
        pipeline.add_stage(AtmosphereStage::with_output(args.output.join("atmosphere")));
    }

    pipeline.run_with_callbacks(
        &mut world,
        |name, i, total| println!("[{}/{}] {}...", i + 1, total, name),
        |name, _, _| println!("  {} done ({:.2}s)", name, start.elapsed().as_secs_f64()),
    )?;

    println!("Land: {:.1}%", world.land_proportion() * 100.0);
    if world.landmass_at_any_edge() {
        println!("Note: land reaches the edge of the map");
    }

    let base = args.output.join(&world.name);
    let preview = PreviewOptions { render_width: args.preview_width };
    export_field_png(
        &world.elevation,
        &with_suffix(&base, "elevation-16.png"),
        &PngExportOptions::default(),
    )?;
    export_field_png(
        &world.sunlight,
        &with_suffix(&base, "sunlight-16.png"),
        &PngExportOptions::default(),
    )?;
    export_rgb_png(&elevation_preview(&world.elevation)?, &with_suffix(&base, "elevation.png"), &preview)?;
    export_rgb_png(
        &sunlight_preview(&world.sunlight, &world.elevation)?,
        &with_suffix(&base, "sunlight.png"),
        &preview,
    )?;
    fs::write(with_suffix(&base, "world.json"), serde_json::to_string_pretty(&world)?)?;

    if let Some(report) = &world.atmosphere {
        print_summary(&report.summary);
    }

    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn run_windsim(options: RunOptions, args: WindsimArgs) -> Result<(), Box<dyn Error>> {
    let world = options.build_world()?;
    let size = options.windsim.size;

    println!("planetsim - Atmosphere Simulation");
    println!("=================================");
    println!("Grid: {}x{}x{}", size.x, size.y, size.z);
    println!("Iterations: {}", options.windsim.iterations);
    println!("Output: {}", args.output.display());

    let mut sim = Windsim::for_world(options.windsim.clone(), &world)?;
    let export = ProfileExportOptions {
        write_graphs: !args.no_graphs,
        write_csv: !args.no_csv,
        ..ProfileExportOptions::default()
    };
    let mut exporter = ProfileExporter::create(&args.output, export)?;

    let summary = sim.run(&mut exporter)?;
    let written = exporter.finish()?;

    print_summary(&summary);
    println!("Snapshots written: {}", written);
    Ok(())
}

fn run_info(options: &RunOptions) -> Result<(), Box<dyn Error>> {
    let sim = &options.windsim;
    let map = options.area.dimension.truncate();
    let layers = sim.layer_geometry(&options.planet, map)?;
    let surface = sim.column_surface(map);

    println!("Atmosphere Configuration");
    println!("========================");
    println!("Planet radius: {:.0} m", options.planet.radius);
    println!("Surface gravity: {} m/s²", options.planet.gravity);
    println!("Atmosphere height: {:.0} m", sim.height);
    println!("Grid: {}x{}x{}", sim.size.x, sim.size.y, sim.size.z);
    println!("Surface cell: {:.1} x {:.1} m", surface.x, surface.y);
    println!();
    println!("{:>5} {:>12} {:>12} {:>12} {:>12}", "layer", "altitude", "width", "height", "depth");
    for (z, layer) in layers.iter().enumerate() {
        println!(
            "{:>5} {:>12.1} {:>12.3} {:>12.3} {:>12.1}",
            z, layer.altitude, layer.dimension.x, layer.dimension.y, layer.dimension.z
        );
    }

    if let Some(cells) = sim.size.cells() {
        let bytes = cells * std::mem::size_of::<planetsim::atmosphere::Windcell>();
        println!();
        println!("Cells: {}", cells);
        println!("Memory: {:.2} MB", bytes as f64 / (1024.0 * 1024.0));
    }
    Ok(())
}

fn print_summary(summary: &planetsim::atmosphere::RunSummary) {
    println!("\nAtmosphere:");
    println!("  Iterations: {}", summary.iterations);
    println!("  Snapshots: {}", summary.snapshots);
    println!("  Mass: {:.6e} kg -> {:.6e} kg", summary.initial_mass, summary.final_mass);
    println!("  Peak vertical speed: {:.4} m/s", summary.peak_vertical_speed);
    println!("  Time: {:.2}s", summary.elapsed.as_secs_f64());
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push("-");
    name.push(suffix);
    PathBuf::from(name)
}
