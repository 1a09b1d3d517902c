//! User structure: position, preferences, bounded history and drawn trail.

use crate::video::{Category, Color, DurationClass, VideoId};
use serde::Serialize;
use std::collections::VecDeque;

/// Unique user identifier
pub type UserId = u64;

/// A 2D position value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One drawn line of a user's path, from its previous anchor to an arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailSegment {
    pub from: Point,
    pub to: Point,
    pub color: Color,
    /// Opacity hint for renderers
    pub alpha: f32,
}

/// Per-category preference weights, normalized to sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preferences {
    weights: [f64; 4],
}

impl Preferences {
    /// Normalize raw non-negative weights. An all-zero draw becomes uniform.
    pub fn normalized(raw: [f64; 4]) -> Self {
        let clamped = raw.map(|w| w.max(0.0));
        let total: f64 = clamped.iter().sum();
        let weights = if total > 0.0 {
            clamped.map(|w| w / total)
        } else {
            [0.25; 4]
        };
        Self { weights }
    }

    /// Draw four uniform weights and normalize them
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self::normalized([rng.gen(), rng.gen(), rng.gen(), rng.gen()])
    }

    #[inline]
    pub fn weight(&self, category: Category) -> f64 {
        self.weights[category.index()]
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn as_array(&self) -> [f64; 4] {
        self.weights
    }
}

/// Fixed-capacity FIFO of recently visited videos. Oldest entries fall off.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    entries: VecDeque<VideoId>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, id: VideoId) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(id);
    }

    #[inline]
    pub fn contains(&self, id: VideoId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &VideoId> {
        self.entries.iter()
    }
}

/// A user in the simulation
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,

    // Physical state
    pub x: f64,
    pub y: f64,
    /// Start of the next trail segment
    pub anchor: Point,
    pub trail: Vec<TrailSegment>,

    // Behavior
    pub target: Option<VideoId>,
    pub history: History,
    pub preferences: Preferences,
    pub engagement_rate: f64,
    pub preferred_duration: DurationClass,
}

/// Result of moving one step toward a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    Moving,
    Arrived,
}

/// Slack for accumulated rounding when deciding the final step
const ARRIVAL_EPSILON: f64 = 1e-9;

impl User {
    pub fn new(
        id: UserId,
        x: f64,
        y: f64,
        preferences: Preferences,
        engagement_rate: f64,
        preferred_duration: DurationClass,
        history_capacity: usize,
    ) -> Self {
        Self {
            id,
            x,
            y,
            anchor: Point::new(x, y),
            trail: Vec::new(),
            target: None,
            history: History::new(history_capacity),
            preferences,
            engagement_rate,
            preferred_duration,
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Step toward `dest`. Within one step of it the user snaps onto it.
    pub fn step_towards(&mut self, dest: Point, step_size: f64) -> Movement {
        let dx = dest.x - self.x;
        let dy = dest.y - self.y;
        let dist = dx.hypot(dy);

        if dist <= step_size + ARRIVAL_EPSILON {
            self.x = dest.x;
            self.y = dest.y;
            return Movement::Arrived;
        }

        self.x += dx / dist * step_size;
        self.y += dy / dist * step_size;
        Movement::Moving
    }

    /// Close the current trail segment at the user's position
    pub fn record_segment(&mut self, color: Color, alpha: f32) {
        let end = self.position();
        self.trail.push(TrailSegment {
            from: self.anchor,
            to: end,
            color,
            alpha,
        });
        self.anchor = end;
    }

    /// Recolor the latest segment, keeping its opacity
    pub fn recolor_last_segment(&mut self, color: Color) {
        if let Some(segment) = self.trail.last_mut() {
            segment.color = color;
        }
    }
}
