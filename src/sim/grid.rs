//! Tile grid world model
//!
//! The arena is a fixed-size grid of tile codes. Solid tiles double as
//! collision rectangles and raycast occluders; the derived obstacle list is
//! what agents and projectiles resolve against.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TILE;

/// A single tile code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Floor,
    /// Outer boundary wall
    Wall,
    /// Interior solid block
    Block,
    /// Exit marker (walkable)
    Exit,
}

impl Tile {
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall | Tile::Block)
    }
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle covering a span of tiles
    pub fn from_tiles(col: usize, row: usize, cols: usize, rows: usize) -> Self {
        let min = Vec2::new(col as f32 * TILE, row as f32 * TILE);
        Self {
            min,
            max: min + Vec2::new(cols as f32 * TILE, rows as f32 * TILE),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        (center - closest).length_squared() <= radius * radius
    }
}

/// Row-major tile grid. Invariant: the outer ring is always `Wall`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub cols: usize,
    pub rows: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn filled(cols: usize, rows: usize, tile: Tile) -> Self {
        Self {
            cols,
            rows,
            tiles: vec![tile; cols * rows],
        }
    }

    /// Tile at (col, row); anything out of bounds reads as `Wall`
    pub fn get(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Tile::Wall;
        }
        self.tiles[row as usize * self.cols + col as usize]
    }

    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.cols && row < self.rows {
            self.tiles[row * self.cols + col] = tile;
        }
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_solid()
    }

    pub fn is_open(&self, col: i32, row: i32) -> bool {
        !self.is_solid(col, row)
    }

    /// Cell containing a pixel position
    pub fn cell_of(pos: Vec2) -> (i32, i32) {
        ((pos.x / TILE).floor() as i32, (pos.y / TILE).floor() as i32)
    }

    /// Center of a cell in pixels
    pub fn cell_center(col: i32, row: i32) -> Vec2 {
        Vec2::new((col as f32 + 0.5) * TILE, (row as f32 + 0.5) * TILE)
    }

    /// Solidity test at a pixel position
    pub fn solid_at(&self, pos: Vec2) -> bool {
        let (col, row) = Self::cell_of(pos);
        self.is_solid(col, row)
    }

    /// Pixel dimensions of the arena
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * TILE, self.rows as f32 * TILE)
    }

    /// One rectangle per solid tile, for collision and occlusion
    pub fn obstacles(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.tiles[row * self.cols + col].is_solid() {
                    out.push(Rect::from_tiles(col, row, 1, 1));
                }
            }
        }
        out
    }

    /// Nearest open cell to (col, row), searched in growing rings.
    /// Falls back to the input cell when the whole neighborhood is solid.
    pub fn snap_to_open(&self, col: i32, row: i32) -> (i32, i32) {
        if self.is_open(col, row) {
            return (col, row);
        }
        for ring in 1..(self.cols.max(self.rows) as i32) {
            for dr in -ring..=ring {
                for dc in -ring..=ring {
                    if dr.abs() != ring && dc.abs() != ring {
                        continue;
                    }
                    if self.is_open(col + dc, row + dr) {
                        return (col + dc, row + dr);
                    }
                }
            }
        }
        (col, row)
    }
}

/// Push a circle out of a rectangle along the axis of minimum penetration.
/// Returns the corrected center, or `None` when there is no overlap.
pub fn resolve_circle_rect(center: Vec2, radius: f32, rect: &Rect) -> Option<Vec2> {
    let closest = center.clamp(rect.min, rect.max);
    let delta = center - closest;
    let d2 = delta.length_squared();
    if d2 > radius * radius {
        return None;
    }
    if d2 > 1e-6 {
        let d = d2.sqrt();
        return Some(center + delta / d * (radius - d));
    }
    // Center is inside the rect: exit through the nearest face
    let left = center.x - rect.min.x;
    let right = rect.max.x - center.x;
    let top = center.y - rect.min.y;
    let bottom = rect.max.y - center.y;
    let m = left.min(right).min(top).min(bottom);
    Some(if m == left {
        Vec2::new(rect.min.x - radius, center.y)
    } else if m == right {
        Vec2::new(rect.max.x + radius, center.y)
    } else if m == top {
        Vec2::new(center.x, rect.min.y - radius)
    } else {
        Vec2::new(center.x, rect.max.y + radius)
    })
}
