//! Affinity scoring: how attractive a video is to a particular user.
//!
//! Scoring is a pure function of the two entities and a clock reading. The
//! age factor uses raw seconds since creation, so its strength depends on how
//! fast the host clock advances relative to the tick rate.

use crate::user::User;
use crate::video::Video;

/// Weight applied when the video's duration is not the user's preference
pub const DURATION_MISMATCH_FACTOR: f64 = 0.5;

/// Individual factors behind an affinity weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakdown {
    pub age_factor: f64,
    pub engagement_factor: f64,
    pub duration_factor: f64,
    pub preference_factor: f64,
}

impl Breakdown {
    /// Compute every factor for `video` as seen by `user` at time `now`
    pub fn of(video: &Video, user: &User, now: f64) -> Self {
        let elapsed = (now - video.created_at).max(0.0);
        let duration_factor = if video.duration == user.preferred_duration {
            1.0
        } else {
            DURATION_MISMATCH_FACTOR
        };

        Self {
            age_factor: 1.0 / (1.0 + elapsed),
            engagement_factor: video.interactions() as f64 / video.visit_count.max(1) as f64,
            duration_factor,
            preference_factor: user.preferences.weight(video.category),
        }
    }

    /// Combine the factors with the video's intrinsic appeal
    pub fn weight(&self, video: &Video) -> f64 {
        (video.excitement + self.engagement_factor + video.quality)
            * self.age_factor
            * self.preference_factor
            * self.duration_factor
    }
}

/// Affinity weight of `video` for `user` at clock reading `now` (seconds)
#[inline]
pub fn affinity(video: &Video, user: &User, now: f64) -> f64 {
    Breakdown::of(video, user, now).weight(video)
}
