//! Detection arbiter
//!
//! Combines enemy geometry, ambient light, concealment and a single
//! occlusion ray into the per-tick caught/not-caught decision. Checks are
//! ordered cheapest first and the scan short-circuits on the first hit.

use glam::Vec2;

use super::enemy::Enemy;
use super::r#gen::Level;
use super::player::Player;
use super::raycast;
use crate::angle_diff;

/// Scan all enemies in order; `Some(index)` for the first one that sees the
/// player. Concealment suppresses detection unconditionally.
pub fn scan(level: &Level, player: &Player) -> Option<usize> {
    if player.concealed() {
        return None;
    }
    let index = level
        .enemies
        .iter()
        .position(|enemy| sees(enemy, player.pos, level));
    if let Some(i) = index {
        log::debug!(
            "detected by {:?} at distance {:.0}",
            level.enemies[i].archetype,
            (level.enemies[i].pos - player.pos).length()
        );
    }
    index
}

/// Range, field of view, then occlusion - in that order
fn sees(enemy: &Enemy, target: Vec2, level: &Level) -> bool {
    if enemy.blinded() {
        return false;
    }
    let to_target = target - enemy.pos;
    let dist = to_target.length();
    if dist > enemy.effective_range(level.ambient_light) {
        return false;
    }
    let bearing = to_target.y.atan2(to_target.x);
    if angle_diff(enemy.heading, bearing).abs() > enemy.fov_half {
        return false;
    }
    !raycast::line_blocked(&level.grid, enemy.pos, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TILE;
    use crate::sim::enemy::Archetype;
    use crate::sim::r#gen::generate;
    use crate::sim::grid::{Tile, TileGrid};
    use glam::Vec2;
    use proptest::prelude::*;

    fn staged_level(enemy: Enemy) -> Level {
        let mut level = generate("detect", 1, false);
        level.grid = TileGrid::filled(20, 20, Tile::Floor);
        level.obstacles = level.grid.obstacles();
        level.enemies = vec![enemy];
        level.ambient_light = 1.0;
        level
    }

    fn watcher(pos: Vec2, heading: f32) -> Enemy {
        Enemy::new(Archetype::Sentry, pos, heading, 0.0)
    }

    #[test]
    fn test_detects_in_open_cone() {
        let level = staged_level(watcher(Vec2::new(100.0, 100.0), 0.0));
        let mut player = Player::at_spawn(Vec2::new(220.0, 100.0));
        player.invuln_timer = 0.0;
        assert_eq!(scan(&level, &player), Some(0));
    }

    #[test]
    fn test_out_of_cone_or_range_misses() {
        let level = staged_level(watcher(Vec2::new(100.0, 100.0), 0.0));
        // Behind the sentry
        let behind = Player::at_spawn(Vec2::new(40.0, 100.0));
        assert_eq!(scan(&level, &behind), None);
        // Far beyond range
        let distant = Player::at_spawn(Vec2::new(100.0 + 2000.0, 100.0));
        assert_eq!(scan(&level, &distant), None);
    }

    #[test]
    fn test_occlusion_blocks_detection() {
        let mut level = staged_level(watcher(Vec2::new(2.5 * TILE, 2.5 * TILE), 0.0));
        for row in 0..20 {
            level.grid.set(4, row, Tile::Block);
        }
        level.obstacles = level.grid.obstacles();
        let player = Player::at_spawn(Vec2::new(6.5 * TILE, 2.5 * TILE));
        assert_eq!(scan(&level, &player), None);
    }

    #[test]
    fn test_blinded_enemy_sees_nothing() {
        let mut enemy = watcher(Vec2::new(100.0, 100.0), 0.0);
        enemy.blind_timer = 1.0;
        let level = staged_level(enemy);
        let player = Player::at_spawn(Vec2::new(220.0, 100.0));
        assert_eq!(scan(&level, &player), None);
    }

    #[test]
    fn test_camera_ignores_ambient_light() {
        let mut level = staged_level(Enemy::new(
            Archetype::Camera,
            Vec2::new(100.0, 100.0),
            0.0,
            0.0,
        ));
        level.ambient_light = 0.55;
        let range = level.enemies[0].effective_range(level.ambient_light);
        assert_eq!(range, Archetype::Camera.view_range());
        // A sentry's range shrinks in the dark
        let sentry = watcher(Vec2::ZERO, 0.0);
        assert!(sentry.effective_range(0.55) < Archetype::Sentry.view_range());
    }

    proptest! {
        /// Concealment beats any enemy geometry: no placement, heading or
        /// archetype may detect a hiding player or one inside an unlocked
        /// safe zone.
        #[test]
        fn prop_concealment_suppresses_detection(
            x in 1.1f32..18.9,
            y in 1.1f32..18.9,
            heading in 0.0f32..std::f32::consts::TAU,
            kind in 0usize..5,
            in_zone in proptest::bool::ANY,
        ) {
            let archetype = [
                Archetype::Patroller,
                Archetype::Sentry,
                Archetype::Seeker,
                Archetype::Slime,
                Archetype::Camera,
            ][kind];
            let enemy = Enemy::new(archetype, Vec2::new(x * TILE, y * TILE), heading, 0.0);
            let mut level = staged_level(enemy);
            let mut player = Player::at_spawn(Vec2::new(10.0 * TILE, 10.0 * TILE));
            if in_zone {
                level.safe_zones[0].rect = crate::sim::grid::Rect::new(
                    player.pos - Vec2::splat(TILE),
                    player.pos + Vec2::splat(TILE),
                );
                level.safe_zones[0].unlocked = true;
                player.in_safe_zone = true;
            } else {
                player.hiding = true;
            }
            prop_assert_eq!(scan(&level, &player), None);
        }
    }
}
