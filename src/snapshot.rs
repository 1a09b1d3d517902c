//! Snapshot structures for renderers.
//!
//! These are plain copies of simulation state taken between ticks, so a
//! renderer never observes a half-applied step.

use crate::stats::Stats;
use crate::user::{Point, TrailSegment, UserId};
use crate::video::{Category, Color};
use crate::world::World;
use serde::Serialize;

/// Lightweight view of a video for rendering
#[derive(Clone, Debug, Serialize)]
pub struct VideoView {
    /// Stable-for-its-lifetime handle, as an opaque integer
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub category: Category,
    pub color: Color,
    pub excitement: f64,
    pub visits: u32,
    pub likes: u32,
    pub comments: u32,
    pub shares: u32,
    /// Overlay text ("E: .. L: .. C: .. S: ..")
    pub label: String,
}

/// Lightweight view of a user for rendering
#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub x: f64,
    pub y: f64,
    /// Position of the current target, if it still exists
    pub target: Option<Point>,
    pub trail: Vec<TrailSegment>,
}

/// Complete world snapshot for rendering
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    /// Current simulation time
    pub time: u64,
    /// Arena side length
    pub arena_size: f64,
    /// Statistics
    pub stats: Stats,
    /// Videos, oldest first
    pub videos: Vec<VideoView>,
    /// Users, oldest first
    pub users: Vec<UserView>,
}

impl WorldSnapshot {
    /// Create a snapshot from the current world state. Trails are cut to the
    /// newest `render.max_trail` segments when that is set.
    pub fn from_world(world: &World) -> Self {
        let max_trail = world.config.render.max_trail;
        let videos = world
            .videos_in_order()
            .map(|(id, v)| VideoView {
                id: slotmap::Key::data(&id).as_ffi(),
                x: v.x,
                y: v.y,
                category: v.category,
                color: v.color(),
                excitement: v.excitement,
                visits: v.visit_count,
                likes: v.like_count,
                comments: v.comment_count,
                shares: v.share_count,
                label: v.label(),
            })
            .collect();

        let users = world
            .users
            .iter()
            .map(|u| UserView {
                id: u.id,
                x: u.x,
                y: u.y,
                target: u
                    .target
                    .and_then(|id| world.video(id))
                    .map(|v| Point::new(v.x, v.y)),
                trail: match max_trail {
                    Some(n) => u.trail[u.trail.len().saturating_sub(n)..].to_vec(),
                    None => u.trail.clone(),
                },
            })
            .collect();

        Self {
            time: world.time,
            arena_size: world.config.arena.size,
            stats: world.stats.clone(),
            videos,
            users,
        }
    }

    /// Total trail segments across all users
    pub fn segment_count(&self) -> usize {
        self.users.iter().map(|u| u.trail.len()).sum()
    }
}
