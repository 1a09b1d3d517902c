//! Render adapters consuming `WorldSnapshot`s.
//!
//! Drawing is kept outside the simulation: a driver ticks the world, builds a
//! snapshot and hands it to any `Renderer`.

use crate::error::Result;
use crate::snapshot::WorldSnapshot;
use crate::video::{Category, Color};
use std::io::Write;

/// Anything that can present a snapshot
pub trait Renderer {
    fn render(&mut self, snapshot: &WorldSnapshot) -> Result<()>;
}

const USER_GLYPH: char = 'o';
const LIKED_TRAIL_GLYPH: char = '+';
const SKIPPED_TRAIL_GLYPH: char = '.';

/// Character-grid renderer for terminals and logs
pub struct AsciiRenderer<W: Write> {
    out: W,
    cols: usize,
    rows: usize,
}

impl<W: Write> AsciiRenderer<W> {
    /// `cols` x `rows` character cells covering the whole arena
    pub fn new(out: W, cols: usize, rows: usize) -> Self {
        Self {
            out,
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Size the grid from `scale` cells per arena unit; rows are halved to
    /// compensate for tall terminal cells
    pub fn with_scale(out: W, arena_size: f64, scale: usize) -> Self {
        let cols = (arena_size * scale as f64).round() as usize;
        Self::new(out, cols, cols / 2)
    }

    fn cell(&self, x: f64, y: f64, arena_size: f64) -> (usize, usize) {
        let fx = (x / arena_size).clamp(0.0, 1.0);
        let fy = (y / arena_size).clamp(0.0, 1.0);
        let col = ((fx * self.cols as f64) as usize).min(self.cols - 1);
        let row = ((fy * self.rows as f64) as usize).min(self.rows - 1);
        // y grows upward
        (self.rows - 1 - row, col)
    }

    /// Rasterize one snapshot into text
    pub fn frame(&self, snapshot: &WorldSnapshot) -> String {
        let size = snapshot.arena_size;
        let mut grid = vec![vec![' '; self.cols]; self.rows];

        for user in &snapshot.users {
            for segment in &user.trail {
                let glyph = if segment.color == Color::NOT_LIKED {
                    SKIPPED_TRAIL_GLYPH
                } else {
                    LIKED_TRAIL_GLYPH
                };
                let length = segment.from.distance_to(segment.to);
                let samples = ((length / size) * self.cols as f64 * 2.0).ceil().max(1.0) as usize;
                for i in 0..=samples {
                    let t = i as f64 / samples as f64;
                    let x = segment.from.x + (segment.to.x - segment.from.x) * t;
                    let y = segment.from.y + (segment.to.y - segment.from.y) * t;
                    let (r, c) = self.cell(x, y, size);
                    grid[r][c] = glyph;
                }
            }
        }

        for user in &snapshot.users {
            let (r, c) = self.cell(user.x, user.y, size);
            grid[r][c] = USER_GLYPH;
        }

        for video in &snapshot.videos {
            let (r, c) = self.cell(video.x, video.y, size);
            grid[r][c] = video.category.glyph();
        }

        let border = format!("+{}+", "-".repeat(self.cols));
        let mut text = String::with_capacity((self.cols + 3) * (self.rows + 4));
        text.push_str(&border);
        text.push('\n');
        for row in grid {
            text.push('|');
            text.extend(row);
            text.push_str("|\n");
        }
        text.push_str(&border);
        text.push('\n');
        text.push_str(&legend());
        text.push('\n');
        text.push_str(&snapshot.stats.summary());
        text.push('\n');
        text
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        let frame = self.frame(snapshot);
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// One-line category legend
pub fn legend() -> String {
    let mut parts: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{} {} ({})", c.glyph(), c.name(), c.color().name))
        .collect();
    parts.push(format!("{} user", USER_GLYPH));
    parts.push(format!("{} liked", LIKED_TRAIL_GLYPH));
    parts.push(format!("{} skipped", SKIPPED_TRAIL_GLYPH));
    parts.join("  ")
}

/// Writes each snapshot as one JSON document per line
pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, snapshot: &WorldSnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}
