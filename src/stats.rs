//! Statistics tracking for the simulation.

use crate::churn::ChurnReport;
use crate::user::User;
use crate::video::Video;
use serde::Serialize;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, Serialize)]
pub struct Stats {
    /// Current simulation time
    pub time: u64,
    /// Users alive after the tick
    pub users: usize,
    /// Videos alive after the tick
    pub videos: usize,
    /// Mean video excitement
    pub excitement_mean: f64,
    /// Highest video excitement
    pub excitement_max: f64,
    /// Mean trail length per user
    pub trail_mean: f64,

    // Per-tick counters
    /// Users that reached their target this tick
    pub arrivals: usize,
    /// Arrivals that ended in a like
    pub likes: usize,
    pub comments: u64,
    pub shares: u64,
    /// Re-targets that fell back to the least attractive video
    pub forced_revisits: usize,
    /// Targets that no longer existed when the user tried to move
    pub stale_targets: usize,
    /// Placements accepted after exhausting the retry budget
    pub placement_fallbacks: usize,
    /// Churn outcome, if churn ran this tick
    pub churn: Option<ChurnReport>,

    // Running totals
    pub total_arrivals: u64,
    pub total_likes: u64,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-tick counters, keeping running totals
    pub fn begin_tick(&mut self) {
        self.arrivals = 0;
        self.likes = 0;
        self.comments = 0;
        self.shares = 0;
        self.forced_revisits = 0;
        self.stale_targets = 0;
        self.placement_fallbacks = 0;
        self.churn = None;
    }

    /// Count one arrival and its outcome
    pub fn record_arrival(&mut self, liked: bool, comments: u32, shares: u32) {
        self.arrivals += 1;
        self.total_arrivals += 1;
        if liked {
            self.likes += 1;
            self.total_likes += 1;
            self.comments += comments as u64;
            self.shares += shares as u64;
        }
    }

    pub fn record_churn(&mut self, report: ChurnReport) {
        self.placement_fallbacks += report.placement_fallbacks;
        self.churn = Some(report);
    }

    /// Update population-level stats from current state
    pub fn update<'a>(&mut self, users: &[User], videos: impl Iterator<Item = &'a Video>) {
        self.users = users.len();

        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = 0.0f64;
        for video in videos {
            count += 1;
            sum += video.excitement;
            max = max.max(video.excitement);
        }
        self.videos = count;
        self.excitement_mean = if count > 0 { sum / count as f64 } else { 0.0 };
        self.excitement_max = max;

        self.trail_mean = if users.is_empty() {
            0.0
        } else {
            users.iter().map(|u| u.trail.len()).sum::<usize>() as f64 / users.len() as f64
        };
    }

    /// Get summary string
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Users:{:4} | Videos:{:3} | Exc:{:6.2} (max {:6.2}) | Arr:{:3} | Likes:{:3} | Total likes:{:6}",
            self.time,
            self.users,
            self.videos,
            self.excitement_mean,
            self.excitement_max,
            self.arrivals,
            self.likes,
            self.total_likes,
        )
    }
}

/// Historical stats for plotting and post-run inspection
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatsHistory {
    /// Stats snapshots at regular intervals
    pub snapshots: Vec<Stats>,
    /// Interval between snapshots
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get user population time series
    pub fn user_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.time, s.users)).collect()
    }

    /// Get mean excitement time series
    pub fn excitement_series(&self) -> Vec<(u64, f64)> {
        self.snapshots.iter().map(|s| (s.time, s.excitement_mean)).collect()
    }
}
