//! Deterministic level generation
//!
//! `generate` is a pure function of (seed, level index, tutorial): the seed
//! string is hashed to 32 bits and combined with the level index to seed a
//! PCG stream, so levels are individually reproducible for share codes.
//! Every placement loop is bounded and falls back to a fixed default cell -
//! the generator never errors and never loops forever.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::{Archetype, Enemy};
use super::grid::{Rect, Tile, TileGrid};
use super::score::bfs_map;
use crate::consts::*;

/// Minimum BFS offset (tiles) between spawn and any sample
const MIN_SAMPLE_OFFSET: i32 = 8;
/// Minimum BFS offset (tiles) between spawn and any enemy
const MIN_ENEMY_OFFSET: i32 = 6;
/// Bounded retry counts for placement loops
const KEYCARD_TRIES: usize = 24;
const SAMPLE_TRIES: usize = 40;
const ENEMY_TRIES: usize = 20;
const ZONE_TRIES: usize = 24;

/// A collectible objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub pos: Vec2,
    pub collected: bool,
}

/// Unlockable concealment region; correlated with its keycard by hue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub rect: Rect,
    pub hue: f32,
    pub unlocked: bool,
    pub visited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keycard {
    pub pos: Vec2,
    pub hue: f32,
    pub taken: bool,
}

/// Everything `generate` produces for one level. Immutable after creation
/// except the per-entity run flags (collected/unlocked/visited/taken) and
/// enemy state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub seed: String,
    pub index: u32,
    pub tutorial: bool,
    pub grid: TileGrid,
    pub obstacles: Vec<Rect>,
    pub samples: Vec<Sample>,
    pub safe_zones: Vec<SafeZone>,
    pub keycards: Vec<Keycard>,
    pub enemies: Vec<Enemy>,
    pub spawn: Vec2,
    pub exit: Rect,
    pub ambient_light: f32,
}

impl Level {
    pub fn all_samples_collected(&self) -> bool {
        self.samples.iter().all(|s| s.collected)
    }
}

/// FNV-1a over the seed bytes; cheap, stable, and good enough to decorrelate
/// share-code seeds
pub fn hash_seed(seed: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in seed.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

fn level_rng(hash: u32, level_index: u32) -> Pcg32 {
    Pcg32::seed_from_u64((u64::from(hash) << 32) | u64::from(level_index.wrapping_add(1)))
}

/// Build a complete level. Identical inputs always produce an identical level.
pub fn generate(seed: &str, level_index: u32, tutorial: bool) -> Level {
    let mut rng = level_rng(hash_seed(seed), level_index);
    let cols = GRID_COLS;
    let rows = GRID_ROWS;
    let mut grid = TileGrid::filled(cols, rows, Tile::Floor);

    // Solid border ring
    for col in 0..cols {
        grid.set(col, 0, Tile::Wall);
        grid.set(col, rows - 1, Tile::Wall);
    }
    for row in 0..rows {
        grid.set(0, row, Tile::Wall);
        grid.set(cols - 1, row, Tile::Wall);
    }

    // Scatter interior blocks
    let block_count = if tutorial {
        12
    } else {
        22 + 3 * level_index.min(8) as usize
    };
    for _ in 0..block_count {
        let w = rng.random_range(1..=3usize);
        let h = rng.random_range(1..=3usize);
        let col = rng.random_range(2..cols - 1 - w);
        let row = rng.random_range(2..rows - 1 - h);
        for r in row..row + h {
            for c in col..col + w {
                grid.set(c, r, Tile::Block);
            }
        }
    }

    let spawn_cell = (2, rng.random_range(2..rows as i32 - 2));
    let exit_cell = (cols as i32 - 3, rng.random_range(2..rows as i32 - 3));

    // Carve a guaranteed-connected path AFTER scattering, so carving always
    // overrides any block that would sever spawn from exit
    carve_path(&mut grid, &mut rng, spawn_cell, exit_cell);

    // Clear a 3x3 pocket around spawn
    for dr in -1..=1 {
        for dc in -1..=1 {
            let (c, r) = (spawn_cell.0 + dc, spawn_cell.1 + dr);
            if c > 0 && r > 0 && (c as usize) < cols - 1 && (r as usize) < rows - 1 {
                grid.set(c as usize, r as usize, Tile::Floor);
            }
        }
    }

    // Stamp the 2x2 exit marker (walkable)
    for dr in 0..2 {
        for dc in 0..2 {
            grid.set((exit_cell.0 + dc) as usize, (exit_cell.1 + dr) as usize, Tile::Exit);
        }
    }
    let exit = Rect::from_tiles(exit_cell.0 as usize, exit_cell.1 as usize, 2, 2);
    let spawn = TileGrid::cell_center(spawn_cell.0, spawn_cell.1);

    // Safe zones, each paired with exactly one keycard sharing its hue
    let zone_count = if tutorial { 1 } else { rng.random_range(1..=3usize) };
    let hue_base = rng.random_range(0.0..360.0f32);
    let mut safe_zones = Vec::with_capacity(zone_count);
    let mut keycards = Vec::with_capacity(zone_count);
    for i in 0..zone_count {
        let hue = (hue_base + i as f32 * 137.5) % 360.0;
        let zone = place_zone(&mut grid, &mut rng, spawn_cell, exit_cell);
        let card_pos = place_keycard(&grid, &mut rng, &zone);
        safe_zones.push(SafeZone {
            rect: zone,
            hue,
            unlocked: false,
            visited: false,
        });
        keycards.push(Keycard {
            pos: card_pos,
            hue,
            taken: false,
        });
    }

    // Samples, rejected until far enough from spawn (topologically)
    let spawn_dist = bfs_map(&grid, spawn_cell);
    let sample_count = if tutorial {
        2
    } else {
        3 + level_index.min(5) as usize
    };
    let mut samples = Vec::with_capacity(sample_count);
    let mut used: Vec<(i32, i32)> = Vec::new();
    for _ in 0..sample_count {
        let cell = place_offset_cell(
            &grid,
            &mut rng,
            &spawn_dist,
            MIN_SAMPLE_OFFSET,
            SAMPLE_TRIES,
            &mut used,
        );
        samples.push(Sample {
            pos: TileGrid::cell_center(cell.0, cell.1),
            collected: false,
        });
    }

    // Enemies from a level-weighted archetype pool
    let enemy_count = if tutorial {
        1
    } else {
        (2 + level_index).min(9) as usize
    };
    let stat_scale = 1.0 + 0.04 * level_index.saturating_sub(1).min(6) as f32;
    let mut enemies = Vec::with_capacity(enemy_count);
    for _ in 0..enemy_count {
        let archetype = sample_archetype(&mut rng, level_index, tutorial);
        let cell = place_offset_cell(
            &grid,
            &mut rng,
            &spawn_dist,
            MIN_ENEMY_OFFSET,
            ENEMY_TRIES,
            &mut used,
        );
        let mut enemy = Enemy::new(
            archetype,
            TileGrid::cell_center(cell.0, cell.1),
            rng.random_range(0.0..TAU),
            rng.random_range(0.0..TAU),
        );
        enemy.speed *= stat_scale;
        enemy.view_range *= stat_scale;
        let wants_loop = matches!(archetype, Archetype::Patroller)
            || (matches!(archetype, Archetype::Seeker) && rng.random_bool(0.5));
        if wants_loop {
            enemy.waypoints = patrol_loop(&grid, &mut rng);
        }
        enemies.push(enemy);
    }

    let ambient_light = if tutorial {
        1.0
    } else {
        (rng.random_range(0.82..1.0) - 0.04 * level_index.min(8) as f32).clamp(0.55, 1.0)
    };

    let obstacles = grid.obstacles();
    log::debug!(
        "generated level {level_index}: {} enemies, {} samples, {} zones, light {ambient_light:.2}",
        enemies.len(),
        samples.len(),
        safe_zones.len(),
    );

    Level {
        seed: seed.to_string(),
        index: level_index,
        tutorial,
        grid,
        obstacles,
        samples,
        safe_zones,
        keycards,
        enemies,
        spawn,
        exit,
        ambient_light,
    }
}

/// Randomized two-axis walk from spawn to exit, carving blocks into floor.
/// Iteration-bounded; finishes with an axis-aligned L when the budget runs
/// out so connectivity is guaranteed either way.
fn carve_path(grid: &mut TileGrid, rng: &mut Pcg32, from: (i32, i32), to: (i32, i32)) {
    let carve = |grid: &mut TileGrid, c: i32, r: i32| {
        if grid.get(c, r) == Tile::Block {
            grid.set(c as usize, r as usize, Tile::Floor);
        }
    };
    let (mut c, mut r) = from;
    carve(grid, c, r);
    let budget = grid.cols * grid.rows * 4;
    for _ in 0..budget {
        if (c, r) == to {
            return;
        }
        let dx = (to.0 - c).signum();
        let dy = (to.1 - r).signum();
        if rng.random_bool(0.15) {
            // Wiggle off the direct course for texture
            let (jc, jr) = [(1, 0), (-1, 0), (0, 1), (0, -1)][rng.random_range(0..4usize)];
            c = (c + jc).clamp(1, grid.cols as i32 - 2);
            r = (r + jr).clamp(1, grid.rows as i32 - 2);
        } else if dx != 0 && (dy == 0 || rng.random_bool(0.55)) {
            c += dx;
        } else if dy != 0 {
            r += dy;
        }
        carve(grid, c, r);
    }
    // Budget exhausted: straight L to the target
    while c != to.0 {
        c += (to.0 - c).signum();
        carve(grid, c, r);
    }
    while r != to.1 {
        r += (to.1 - r).signum();
        carve(grid, c, r);
    }
}

/// Carve and return a 2x2 safe-zone room away from spawn and exit
fn place_zone(
    grid: &mut TileGrid,
    rng: &mut Pcg32,
    spawn_cell: (i32, i32),
    exit_cell: (i32, i32),
) -> Rect {
    let cols = grid.cols as i32;
    let rows = grid.rows as i32;
    let mut cell = (cols / 2, rows / 2);
    for _ in 0..ZONE_TRIES {
        let c = rng.random_range(2..cols - 3);
        let r = rng.random_range(2..rows - 3);
        let near_spawn = (c - spawn_cell.0).abs() < 4 && (r - spawn_cell.1).abs() < 4;
        let near_exit = (c - exit_cell.0).abs() < 4 && (r - exit_cell.1).abs() < 4;
        if !near_spawn && !near_exit {
            cell = (c, r);
            break;
        }
    }
    // The zone interior is always walkable
    for dr in 0..2 {
        for dc in 0..2 {
            grid.set((cell.0 + dc) as usize, (cell.1 + dr) as usize, Tile::Floor);
        }
    }
    Rect::from_tiles(cell.0 as usize, cell.1 as usize, 2, 2)
}

/// Keycard lands on an open cell outside its own zone; bounded retries with
/// a fixed fallback cell
fn place_keycard(grid: &TileGrid, rng: &mut Pcg32, zone: &Rect) -> Vec2 {
    for _ in 0..KEYCARD_TRIES {
        let c = rng.random_range(1..grid.cols as i32 - 1);
        let r = rng.random_range(1..grid.rows as i32 - 1);
        if !grid.is_open(c, r) {
            continue;
        }
        let pos = TileGrid::cell_center(c, r);
        if !zone.contains(pos) {
            return pos;
        }
    }
    fallback_cell(grid)
}

/// Open cell at a minimum BFS offset from spawn, avoiding already-used
/// cells; bounded retries with a fixed fallback cell
fn place_offset_cell(
    grid: &TileGrid,
    rng: &mut Pcg32,
    spawn_dist: &[i32],
    min_offset: i32,
    tries: usize,
    used: &mut Vec<(i32, i32)>,
) -> (i32, i32) {
    for _ in 0..tries {
        let c = rng.random_range(1..grid.cols as i32 - 1);
        let r = rng.random_range(1..grid.rows as i32 - 1);
        if !grid.is_open(c, r) || used.contains(&(c, r)) {
            continue;
        }
        let d = spawn_dist[r as usize * grid.cols + c as usize];
        if d >= min_offset {
            used.push((c, r));
            return (c, r);
        }
    }
    let fallback = TileGrid::cell_of(fallback_cell(grid));
    used.push(fallback);
    fallback
}

/// Fixed default cell for exhausted placement loops: the nearest open cell
/// to the arena center
fn fallback_cell(grid: &TileGrid) -> Vec2 {
    let (c, r) = grid.snap_to_open(grid.cols as i32 / 2, grid.rows as i32 / 2);
    TileGrid::cell_center(c, r)
}

/// 4-waypoint loop around a random center, each corner snapped to the
/// nearest open tile
fn patrol_loop(grid: &TileGrid, rng: &mut Pcg32) -> Vec<Vec2> {
    let center_c = rng.random_range(3..grid.cols as i32 - 3);
    let center_r = rng.random_range(3..grid.rows as i32 - 3);
    let d = rng.random_range(2..=4);
    [(d, d), (-d, d), (-d, -d), (d, -d)]
        .into_iter()
        .map(|(dc, dr)| {
            let (c, r) = grid.snap_to_open(center_c + dc, center_r + dr);
            TileGrid::cell_center(c, r)
        })
        .collect()
}

fn sample_archetype(rng: &mut Pcg32, level_index: u32, tutorial: bool) -> Archetype {
    if tutorial {
        return Archetype::Patroller;
    }
    let roll = rng.random_range(0..100u32);
    if level_index >= 3 && roll < 12 {
        Archetype::Camera
    } else if level_index >= 2 && roll < 30 {
        Archetype::Seeker
    } else if roll < 45 {
        Archetype::Sentry
    } else if level_index >= 2 && roll < 62 {
        Archetype::Slime
    } else {
        Archetype::Patroller
    }
}
