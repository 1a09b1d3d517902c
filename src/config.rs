//! Configuration system for the video simulation.
//!
//! Supports YAML configuration files with sensible defaults. Every knob the
//! driver uses lives here rather than as a constant in the simulation code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub arena: ArenaConfig,
    pub population: PopulationConfig,
    pub movement: MovementConfig,
    pub engagement: EngagementConfig,
    pub churn: ChurnConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Arena geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Side length of the square arena
    pub size: f64,
    /// Inset applied on every side when placing entities
    pub margin: f64,
}

/// Initial population and placement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of users at start
    pub initial_users: usize,
    /// Number of videos requested at start (split evenly across categories)
    pub initial_videos: usize,
    /// Maximum attempts when searching for a valid position
    pub max_placement_attempts: usize,
    /// Minimum distance between videos placed in the same batch
    pub min_spacing: f64,
    /// Half-width of the square jitter around a category cluster center
    pub cluster_jitter: f64,
    /// Vocabulary tags are sampled from
    pub tag_vocabulary: Vec<String>,
    /// Tags per video (sampled with replacement)
    pub tags_per_video: usize,
}

/// User movement and memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Distance travelled per tick
    pub step_size: f64,
    /// Number of recently visited videos a user avoids
    pub history_capacity: usize,
}

/// Interaction outcome tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Excitement added to a video on every arrival
    pub excitement_increment: f64,
    /// Upper bound (inclusive) on comments per like
    pub max_comments_per_like: u32,
    /// Upper bound (inclusive) on shares per like
    pub max_shares_per_like: u32,
}

/// Periodic population refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// Ticks between churn passes
    pub interval: u64,
    /// Video capacity, oldest trimmed first
    pub max_videos: usize,
    /// User capacity, oldest trimmed first
    pub max_users: usize,
    /// Smallest batch of new entities per pass
    pub min_batch: usize,
    /// Largest batch of new entities per pass
    pub max_batch: usize,
}

/// Presentation hints carried in snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Opacity hint attached to every trail segment
    pub trail_alpha: f32,
    /// Character cells per arena unit for the ASCII renderer
    pub ascii_scale: usize,
    /// Newest trail segments per user copied into each snapshot; all when unset
    #[serde(default)]
    pub max_trail: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between stats summaries
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            population: PopulationConfig::default(),
            movement: MovementConfig::default(),
            engagement: EngagementConfig::default(),
            churn: ChurnConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            margin: 1.0,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_users: 50,
            initial_videos: 20,
            max_placement_attempts: 1000,
            min_spacing: 1.0,
            cluster_jitter: 1.0,
            tag_vocabulary: ["funny", "tutorial", "review", "vlog", "recipe"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            tags_per_video: 3,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            history_capacity: 15,
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            excitement_increment: 0.1,
            max_comments_per_like: 2,
            max_shares_per_like: 1,
        }
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            interval: 200,
            max_videos: 30,
            max_users: 100,
            min_batch: 1,
            max_batch: 5,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trail_alpha: 0.05,
            ascii_scale: 4,
            max_trail: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 50,
            log_level: "info".to_string(),
        }
    }
}

impl ArenaConfig {
    /// Lower bound of the margin-inset placement area
    pub fn min(&self) -> f64 {
        self.margin
    }

    /// Upper bound of the margin-inset placement area
    pub fn max(&self) -> f64 {
        self.size - self.margin
    }

    /// Strict containment in the margin-inset area
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min() < x && x < self.max() && self.min() < y && y < self.max()
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.arena.size.is_nan() || self.arena.size <= 0.0 {
            return invalid("arena.size must be > 0");
        }
        if self.arena.margin < 0.0 || self.arena.margin * 2.0 >= self.arena.size {
            return invalid("arena.margin must be >= 0 and leave a non-empty placement area");
        }
        if self.population.max_placement_attempts == 0 {
            return invalid("population.max_placement_attempts must be > 0");
        }
        if self.population.min_spacing < 0.0 || self.population.cluster_jitter < 0.0 {
            return invalid("population spacing and jitter must be >= 0");
        }
        if self.population.tag_vocabulary.is_empty() {
            return invalid("population.tag_vocabulary must not be empty");
        }
        if self.movement.step_size.is_nan() || self.movement.step_size <= 0.0 {
            return invalid("movement.step_size must be > 0");
        }
        if self.movement.history_capacity == 0 {
            return invalid("movement.history_capacity must be > 0");
        }
        if self.engagement.excitement_increment < 0.0 {
            return invalid("engagement.excitement_increment must be >= 0");
        }
        if self.churn.interval == 0 {
            return invalid("churn.interval must be > 0");
        }
        if self.churn.min_batch == 0 || self.churn.min_batch > self.churn.max_batch {
            return invalid("churn batch bounds must satisfy 0 < min_batch <= max_batch");
        }
        if self.population.initial_users > self.churn.max_users {
            return invalid("initial_users cannot exceed churn.max_users");
        }
        if self.population.initial_videos > self.churn.max_videos {
            return invalid("initial_videos cannot exceed churn.max_videos");
        }
        if self.logging.stats_interval == 0 {
            return invalid("logging.stats_interval must be > 0");
        }
        Ok(())
    }
}
