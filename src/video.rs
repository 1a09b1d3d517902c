//! Video entities and their closed category/duration vocabularies.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

new_key_type! {
    /// Generational handle to a video. Goes stale once the video is trimmed.
    pub struct VideoId;
}

/// Video category. The set is closed; every lookup is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Entertainment,
    Food,
    Vlog,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Technology,
        Category::Entertainment,
        Category::Food,
        Category::Vlog,
    ];

    /// Dense index, used for per-category tables
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Category::Technology => 0,
            Category::Entertainment => 1,
            Category::Food => 2,
            Category::Vlog => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Entertainment => "Entertainment",
            Category::Food => "Food",
            Category::Vlog => "Vlog",
        }
    }

    /// Display color for videos and liked trail segments
    pub fn color(self) -> Color {
        match self {
            Category::Technology => Color::BLUE,
            Category::Entertainment => Color::PURPLE,
            Category::Food => Color::ORANGE,
            Category::Vlog => Color::GREEN,
        }
    }

    /// Single-character marker for text renderers
    pub fn glyph(self) -> char {
        match self {
            Category::Technology => 'T',
            Category::Entertainment => 'E',
            Category::Food => 'F',
            Category::Vlog => 'V',
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// Coarse video length bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Short,
    Medium,
    Long,
}

impl DurationClass {
    pub const ALL: [DurationClass; 3] = [DurationClass::Short, DurationClass::Medium, DurationClass::Long];

    pub fn name(self) -> &'static str {
        match self {
            DurationClass::Short => "short",
            DurationClass::Medium => "medium",
            DurationClass::Long => "long",
        }
    }

    /// Uniform pick over all classes
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DurationClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationClass::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::UnknownDuration(s.to_string()))
    }
}

/// Named RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

impl Color {
    pub const BLUE: Color = Color { name: "blue", rgb: (0, 0, 255) };
    pub const PURPLE: Color = Color { name: "purple", rgb: (128, 0, 128) };
    pub const ORANGE: Color = Color { name: "orange", rgb: (255, 165, 0) };
    pub const GREEN: Color = Color { name: "green", rgb: (0, 128, 0) };
    /// Marker for trail segments whose visit did not end in a like
    pub const NOT_LIKED: Color = Color { name: "white", rgb: (255, 255, 255) };
}

/// A video sitting in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub x: f64,
    pub y: f64,
    pub category: Category,
    pub quality: f64,
    pub tags: Vec<String>,
    pub duration: DurationClass,
    /// Grows on every arrival, never decreases
    pub excitement: f64,
    pub visit_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
    /// Clock reading (seconds) at creation
    pub created_at: f64,
}

impl Video {
    /// Fresh video with zeroed counters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: f64,
        y: f64,
        category: Category,
        quality: f64,
        tags: Vec<String>,
        duration: DurationClass,
        excitement: f64,
        created_at: f64,
    ) -> Self {
        Self {
            x,
            y,
            category,
            quality,
            tags,
            duration,
            excitement,
            visit_count: 0,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            created_at,
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.category.color()
    }

    /// Likes, comments and shares summed
    #[inline]
    pub fn interactions(&self) -> u32 {
        self.like_count + self.comment_count + self.share_count
    }

    /// Overlay text shown next to the video marker
    pub fn label(&self) -> String {
        format!(
            "E: {:.2}\nL: {}\nC: {}\nS: {}",
            self.excitement, self.like_count, self.comment_count, self.share_count
        )
    }
}
