//! VIDSIM - CLI Entry Point
//!
//! Runs the video simulation headless, optionally rendering frames.

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use vidsim::render::{AsciiRenderer, JsonLinesRenderer, Renderer};
use vidsim::snapshot::WorldSnapshot;
use vidsim::{benchmark, Config, World};

#[derive(Parser)]
#[command(name = "vidsim")]
#[command(version)]
#[command(about = "Users drifting toward videos: a toy recommendation loop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RenderMode {
    /// Stats summaries only
    Off,
    /// Character-grid frames on stdout
    Ascii,
    /// One JSON snapshot per line on stdout
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// How to present frames
        #[arg(short, long, value_enum, default_value_t = RenderMode::Off)]
        render: RenderMode,

        /// Ticks between rendered frames
        #[arg(long, default_value = "1")]
        every: u64,

        /// Quiet mode (no stats summaries)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Initial users
        #[arg(short, long, default_value = "100")]
        users: usize,

        /// Initial videos
        #[arg(short, long, default_value = "30")]
        videos: usize,
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
            ticks,
            seed,
            render,
            every,
            quiet,
        } => run_simulation(config, ticks, seed, render, every, quiet),

        Commands::Benchmark {
            ticks,
            users,
            videos,
        } => {
            init_logging("info");
            run_benchmark(ticks, users, videos)
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
    ticks: u64,
    seed: Option<u64>,
    render: RenderMode,
    every: u64,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let (config, loaded) = if config_path.exists() {
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

    let seed = seed.unwrap_or_else(rand::random);
    let mut world = World::try_new(config.clone(), seed)?;

    log::info!(
        "Starting simulation: seed={} users={} videos={} ticks={}",
        seed,
        world.user_count(),
        world.video_count(),
        ticks
    );

    let mut renderer: Option<Box<dyn Renderer>> = match render {
        RenderMode::Off => None,
        RenderMode::Ascii => Some(Box::new(AsciiRenderer::with_scale(
            io::stdout(),
            config.arena.size,
            config.render.ascii_scale,
        ))),
        RenderMode::Json => Some(Box::new(JsonLinesRenderer::new(io::stdout().lock()))),
    };

    let every = every.max(1);
    let stats_interval = config.logging.stats_interval;
    let start = Instant::now();

    for _ in 0..ticks {
        world.tick();

        if let Some(renderer) = renderer.as_mut() {
            if world.time % every == 0 {
                renderer.render(&WorldSnapshot::from_world(&world))?;
            }
        }

        if !quiet && world.time % stats_interval == 0 {
            log::info!("{}", world.stats.summary());
        }
    }

    let elapsed = start.elapsed();
    log::info!("=== Simulation Complete ===");
    log::info!("Time: {:.2}s", elapsed.as_secs_f64());
    log::info!("Ticks: {}", world.time);
    log::info!("Speed: {:.1} ticks/s", world.time as f64 / elapsed.as_secs_f64());
    log::info!("Users: {}  Videos: {}", world.user_count(), world.video_count());
    log::info!(
        "Arrivals: {}  Likes: {}",
        world.stats.total_arrivals,
        world.stats.total_likes
    );

    Ok(())
}

fn run_benchmark(ticks: u64, users: usize, videos: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== VIDSIM Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Users: {}  Videos: {}", users, videos);
    println!();

    let result = benchmark(ticks, users, videos);
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
