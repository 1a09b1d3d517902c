//! # VIDSIM
//!
//! Frame-stepped simulation of users drifting toward videos in a 2D arena.
//!
//! ## Features
//!
//! - **Recommendation loop**: users walk to the video with the highest
//!   affinity they have not recently visited, then like, comment and share
//! - **Living population**: periodic churn adds fresh videos and users and
//!   trims the oldest to fixed capacities
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded random number generation and pluggable clocks
//! - **Headless**: renderers consume read-only snapshots between ticks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vidsim::{Config, World};
//!
//! let mut world = World::new(Config::default());
//! world.run(1000);
//!
//! println!("Users: {}", world.user_count());
//! println!("Likes so far: {}", world.stats.total_likes);
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use vidsim::render::{AsciiRenderer, Renderer};
//! use vidsim::snapshot::WorldSnapshot;
//! use vidsim::{Config, World};
//!
//! let mut world = World::new_with_seed(Config::default(), 42);
//! let mut renderer = AsciiRenderer::new(std::io::sink(), 40, 20);
//!
//! for _ in 0..10 {
//!     world.tick();
//!     renderer.render(&WorldSnapshot::from_world(&world)).unwrap();
//! }
//! ```

pub mod churn;
pub mod clock;
pub mod config;
pub mod error;
pub mod population;
pub mod render;
pub mod scoring;
pub mod snapshot;
pub mod stats;
pub mod user;
pub mod video;
pub mod world;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use user::User;
pub use video::{Category, DurationClass, Video, VideoId};
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, users: usize, videos: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.initial_users = users;
    config.population.initial_videos = videos;
    config.churn.max_users = config.churn.max_users.max(users);
    config.churn.max_videos = config.churn.max_videos.max(videos);

    let mut world = World::new(config);

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks,
        initial_users: users,
        final_users: world.user_count(),
        final_videos: world.video_count(),
        total_arrivals: world.stats.total_arrivals,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_users: usize,
    pub final_users: usize,
    pub final_videos: usize,
    pub total_arrivals: u64,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Users: {} -> {}", self.initial_users, self.final_users)?;
        writeln!(f, "Videos: {}", self.final_videos)?;
        writeln!(f, "Arrivals: {}", self.total_arrivals)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut world = World::new(Config::default());
        world.run(100);
        assert_eq!(world.time, 100);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(100, 50, 20);
        assert_eq!(result.ticks, 100);
        assert!(result.ticks_per_second > 0.0);
    }
}
