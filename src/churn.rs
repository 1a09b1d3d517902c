//! Periodic population churn.
//!
//! Adds a small random batch of videos and users, drops a random share of the
//! longest-standing users, and trims both populations to capacity oldest-first.

use crate::population::{generate_users, generate_videos};
use crate::world::World;
use rand::Rng;
use serde::Serialize;

/// What one churn pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChurnReport {
    pub videos_added: usize,
    pub videos_removed: usize,
    pub users_added: usize,
    pub users_removed: usize,
    pub placement_fallbacks: usize,
}

impl World {
    /// Refresh the population. Afterwards neither population exceeds its
    /// configured capacity.
    pub fn churn(&mut self) -> ChurnReport {
        let now = self.clock.now();
        let min_batch = self.config.churn.min_batch;
        let max_batch = self.config.churn.max_batch.max(min_batch);
        let mut report = ChurnReport::default();

        // Videos
        let requested = self.rng.gen_range(min_batch..=max_batch);
        let videos = generate_videos(requested, &self.config, &mut self.rng, now);
        report.videos_added = videos.items.len();
        report.placement_fallbacks += videos.fallbacks;
        for video in videos.items {
            self.insert_video(video);
        }
        report.videos_removed = self.trim_videos(self.config.churn.max_videos);

        // Users
        if !self.users.is_empty() {
            let departing = self.rng.gen_range(0..=self.users.len());
            self.users.drain(..departing);
            report.users_removed = departing;
        }

        let requested = self.rng.gen_range(min_batch..=max_batch);
        let users = generate_users(requested, &self.config, &mut self.rng, &mut self.next_user_id);
        report.users_added = users.items.len();
        report.placement_fallbacks += users.fallbacks;
        self.users.extend(users.items);
        report.users_removed += self.trim_users(self.config.churn.max_users);

        log::debug!(
            "Churn at t={}: videos +{} -{}, users +{} -{}",
            self.time,
            report.videos_added,
            report.videos_removed,
            report.users_added,
            report.users_removed
        );

        report
    }
}
