//! TILELIFE - CLI Entry Point
//!
//! Grid-based predator/prey simulator.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tilelife::seasons::SeasonalSchedule;
use tilelife::{benchmark, Config, World};

#[derive(Parser)]
#[command(name = "tilelife")]
#[command(version)]
#[command(about = "Grid-based predator/prey artificial-life simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of steps to simulate
        #[arg(short, long, default_value = "10000")]
        steps: u64,

        /// Output directory for the stats history
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Drive food regrowth through the seasonal schedule
        #[arg(long)]
        seasons: bool,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Population size
        #[arg(short, long, default_value = "600")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            output,
            seed,
            seasons,
            quiet,
        } => run_simulation(config, steps, output, seed, seasons, quiet),

        Commands::Benchmark { steps, population } => {
            init_logging("info");
            run_benchmark(steps, population)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run_simulation(
    config_path: PathBuf,
    steps: u64,
    output: PathBuf,
    seed: Option<u64>,
    seasons: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let (mut config, loaded) = if config_path.exists() {
        (Config::from_file(&config_path)?, true)
    } else {
        (Config::default(), false)
    };
    init_logging(&config.logging.log_level);

    if loaded {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }
    if seasons {
        config.seasons.enabled = true;
    }

    std::fs::create_dir_all(&output)?;

    // Create world
    let mut world = match seed {
        Some(s) => {
            log::info!("Using seed: {}", s);
            World::new_with_seed(config.clone(), s)?
        }
        None => World::new(config.clone())?,
    };
    world.populate()?;

    let mut schedule = SeasonalSchedule::for_world(config.seasons.clone(), &world);
    schedule.apply(&mut world);

    println!("Starting simulation");
    println!("  Initial population: {}", world.population());
    println!("  Grid size: {}x{}", config.world.width, config.world.height);
    println!("  Steps: {}", steps);
    println!("  Seed: {}", world.seed());
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval.max(1);

    for _ in 0..steps {
        world.step();
        schedule.advance(&mut world);

        // Stats output
        if !quiet && world.time % stats_interval == 0 {
            println!("{}", world.stats().summary());
        }

        // Check for extinction
        if world.is_extinct() {
            println!("\nPopulation extinct at step {}", world.time);
            break;
        }
    }

    let elapsed = start.elapsed();
    let steps_per_sec = world.time as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Steps: {}", world.time);
    println!("Speed: {:.1} steps/s", steps_per_sec);
    println!("Final population: {}", world.population());
    println!("Max generation: {}", world.stats().generation_max);
    for species in &world.stats().species {
        println!(
            "  {:<12} {:>6}  hunger {:.0}  age {:.1}",
            species.name, species.population, species.hunger_mean, species.age_mean
        );
    }

    // Save stats history
    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path)?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_benchmark(steps: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TILELIFE Benchmark ===");
    println!("Steps: {}", steps);
    println!("Population: {}", population);
    println!();

    let result = benchmark(steps, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
