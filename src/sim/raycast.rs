//! Line-of-sight raycasting
//!
//! DDA marching over the tile grid: rays step from tile boundary to tile
//! boundary until they enter a solid tile or run out of range. Used for the
//! sampled vision fan handed to the renderer and for single-ray occlusion
//! tests between an enemy and the player.

use glam::Vec2;

use super::grid::TileGrid;
use crate::consts::TILE;
use crate::heading_vec;

/// March a ray from `origin` along `angle`, returning either the point where
/// it enters a solid tile or the max-range endpoint. Pure and deterministic.
pub fn cast(grid: &TileGrid, origin: Vec2, angle: f32, max_range: f32) -> Vec2 {
    let dir = heading_vec(angle);
    let (mut col, mut row) = TileGrid::cell_of(origin);
    if grid.is_solid(col, row) {
        return origin;
    }

    let step_x: i32 = if dir.x > 0.0 { 1 } else { -1 };
    let step_y: i32 = if dir.y > 0.0 { 1 } else { -1 };
    let t_delta_x = if dir.x.abs() > 1e-6 {
        TILE / dir.x.abs()
    } else {
        f32::INFINITY
    };
    let t_delta_y = if dir.y.abs() > 1e-6 {
        TILE / dir.y.abs()
    } else {
        f32::INFINITY
    };

    // Ray distance to the first vertical / horizontal tile boundary
    let next_x = if dir.x > 0.0 { (col + 1) as f32 } else { col as f32 } * TILE;
    let next_y = if dir.y > 0.0 { (row + 1) as f32 } else { row as f32 } * TILE;
    let mut t_max_x = if t_delta_x.is_finite() {
        (next_x - origin.x) / dir.x
    } else {
        f32::INFINITY
    };
    let mut t_max_y = if t_delta_y.is_finite() {
        (next_y - origin.y) / dir.y
    } else {
        f32::INFINITY
    };

    loop {
        let t = t_max_x.min(t_max_y);
        if t > max_range {
            return origin + dir * max_range;
        }
        if t_max_x < t_max_y {
            col += step_x;
            t_max_x += t_delta_x;
        } else {
            row += step_y;
            t_max_y += t_delta_y;
        }
        if grid.is_solid(col, row) {
            return origin + dir * t;
        }
    }
}

/// Occlusion test: true when a solid tile sits between `from` and `to`.
/// The ray counts as blocked when it stops materially short of the target.
pub fn line_blocked(grid: &TileGrid, from: Vec2, to: Vec2) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist <= 1e-3 {
        return false;
    }
    let hit = cast(grid, from, delta.y.atan2(delta.x), dist);
    (hit - from).length() + 1.0 < dist
}

/// Sampled vision polygon: `rays` endpoints fanned across the field of view.
/// Consumed by the renderer; the arbiter uses single rays instead.
pub fn vision_fan(
    grid: &TileGrid,
    origin: Vec2,
    heading: f32,
    fov_half: f32,
    range: f32,
    rays: usize,
) -> Vec<Vec2> {
    (0..rays)
        .map(|i| {
            let t = if rays > 1 {
                i as f32 / (rays - 1) as f32
            } else {
                0.5
            };
            let angle = heading - fov_half + t * 2.0 * fov_half;
            cast(grid, origin, angle, range)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Tile;

    fn open_grid() -> TileGrid {
        TileGrid::filled(20, 20, Tile::Floor)
    }

    #[test]
    fn test_cast_unobstructed_reaches_max_range() {
        let grid = open_grid();
        let origin = Vec2::new(100.0, 100.0);
        let hit = cast(&grid, origin, 0.35, 180.0);
        assert!(((hit - origin).length() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_cast_stops_at_adjacent_block() {
        let mut grid = open_grid();
        grid.set(5, 3, Tile::Block); // x in [160, 192)
        let origin = Vec2::new(100.0, 3.5 * TILE);
        let hit = cast(&grid, origin, 0.0, 500.0);
        assert!((hit.x - 160.0).abs() < 1e-3, "hit at {hit}");
        // Never past the far side of the block
        assert!(hit.x <= 192.0);
    }

    #[test]
    fn test_line_blocked_through_wall() {
        let mut grid = open_grid();
        for row in 0..20 {
            grid.set(10, row, Tile::Block);
        }
        let a = Vec2::new(64.0, 300.0);
        let b = Vec2::new(500.0, 300.0);
        assert!(line_blocked(&grid, a, b));
        assert!(!line_blocked(&grid, a, Vec2::new(200.0, 300.0)));
    }

    #[test]
    fn test_vision_fan_endpoint_count() {
        let grid = open_grid();
        let fan = vision_fan(&grid, Vec2::new(320.0, 320.0), 0.0, 0.6, 150.0, 24);
        assert_eq!(fan.len(), 24);
        for p in fan {
            assert!((p - Vec2::new(320.0, 320.0)).length() <= 150.0 + 1e-3);
        }
    }
}
