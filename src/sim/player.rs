//! Player kinematics and concealment
//!
//! The player is a kinematic circle: intent gives a movement vector, dash is
//! a short impulse on a cooldown, and concealment is the binary OR of manual
//! hiding, unlocked safe-zone containment, and the respawn grace window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::move_and_collide;
use super::grid::{Rect, TileGrid};
use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: f32,
    pub alive: bool,
    /// Manual hide; stops movement and suppresses detection
    pub hiding: bool,
    /// Derived each tick from unlocked safe-zone containment
    pub in_safe_zone: bool,
    pub invuln_timer: f32,
    pub dash_cooldown: f32,
    pub dash_timer: f32,
    pub dash_vec: Vec2,
    pub stealth: bool,
}

impl Player {
    pub fn at_spawn(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            facing: 0.0,
            alive: true,
            hiding: false,
            in_safe_zone: false,
            invuln_timer: 0.0,
            dash_cooldown: 0.0,
            dash_timer: 0.0,
            dash_vec: Vec2::ZERO,
            stealth: false,
        }
    }

    /// Concealment is binary and total: any of the three suppresses detection
    pub fn concealed(&self) -> bool {
        self.hiding || self.in_safe_zone || self.invuln_timer > 0.0
    }

    /// Reset kinematics to spawn with a fresh grace window. Does not touch
    /// the level; only the player moves.
    pub fn respawn(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.hiding = false;
        self.in_safe_zone = false;
        self.dash_timer = 0.0;
        self.dash_vec = Vec2::ZERO;
        self.invuln_timer = RESPAWN_INVULN;
        self.alive = true;
    }

    /// Ambient noise radius for the current motion; 0 when quiet
    pub fn ambient_noise_radius(&self) -> f32 {
        if self.dash_timer > 0.0 {
            DASH_NOISE_RADIUS
        } else if self.vel.length() > STEALTH_SPEED + 1.0 {
            MOVE_NOISE_RADIUS
        } else {
            0.0
        }
    }

    /// Integrate one tick of movement. Returns (distance moved, dash started).
    pub fn update_movement(
        &mut self,
        dt: f32,
        move_dir: Vec2,
        stealth: bool,
        hide: bool,
        dash: bool,
        grid: &TileGrid,
        obstacles: &[Rect],
    ) -> (f32, bool) {
        self.invuln_timer = (self.invuln_timer - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.stealth = stealth;
        self.hiding = hide;

        let dir = if move_dir.length_squared() > 1e-6 {
            move_dir.normalize()
        } else {
            Vec2::ZERO
        };

        let mut dashed = false;
        if dash && self.dash_timer <= 0.0 && self.dash_cooldown <= 0.0 && dir != Vec2::ZERO {
            self.dash_timer = DASH_DURATION;
            self.dash_cooldown = DASH_COOLDOWN;
            self.dash_vec = dir;
            dashed = true;
        }

        if self.dash_timer > 0.0 {
            self.dash_timer -= dt;
            self.vel = self.dash_vec * DASH_SPEED;
        } else if self.hiding {
            self.vel = Vec2::ZERO;
        } else {
            let speed = if stealth { STEALTH_SPEED } else { PLAYER_SPEED };
            self.vel = dir * speed;
        }

        if self.vel.length_squared() > 1e-6 {
            self.facing = self.vel.y.atan2(self.vel.x);
        }

        let before = self.pos;
        self.pos = move_and_collide(self.pos, PLAYER_RADIUS, self.vel * dt, grid, obstacles);
        ((self.pos - before).length(), dashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Tile;

    fn open_world() -> (TileGrid, Vec<Rect>) {
        let grid = TileGrid::filled(20, 20, Tile::Floor);
        let obstacles = grid.obstacles();
        (grid, obstacles)
    }

    #[test]
    fn test_concealment_sources() {
        let mut player = Player::at_spawn(Vec2::new(100.0, 100.0));
        assert!(!player.concealed());
        player.hiding = true;
        assert!(player.concealed());
        player.hiding = false;
        player.in_safe_zone = true;
        assert!(player.concealed());
        player.in_safe_zone = false;
        player.invuln_timer = 0.5;
        assert!(player.concealed());
    }

    #[test]
    fn test_dash_consumes_cooldown() {
        let (grid, obstacles) = open_world();
        let mut player = Player::at_spawn(Vec2::new(100.0, 100.0));
        let dt = 1.0 / 60.0;
        let (_, dashed) =
            player.update_movement(dt, Vec2::new(1.0, 0.0), false, false, true, &grid, &obstacles);
        assert!(dashed);
        assert!(player.dash_cooldown > 0.0);
        // A second request during cooldown is ignored
        for _ in 0..20 {
            let (_, again) = player.update_movement(
                dt,
                Vec2::new(1.0, 0.0),
                false,
                false,
                true,
                &grid,
                &obstacles,
            );
            assert!(!again);
        }
    }

    #[test]
    fn test_hiding_stops_movement() {
        let (grid, obstacles) = open_world();
        let mut player = Player::at_spawn(Vec2::new(100.0, 100.0));
        player.update_movement(0.1, Vec2::new(1.0, 0.0), false, true, false, &grid, &obstacles);
        assert_eq!(player.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_noise_radius_by_mode() {
        let (grid, obstacles) = open_world();
        let mut player = Player::at_spawn(Vec2::new(200.0, 200.0));
        let dt = 1.0 / 60.0;
        player.update_movement(dt, Vec2::new(1.0, 0.0), false, false, false, &grid, &obstacles);
        assert_eq!(player.ambient_noise_radius(), MOVE_NOISE_RADIUS);
        player.update_movement(dt, Vec2::new(1.0, 0.0), true, false, false, &grid, &obstacles);
        assert_eq!(player.ambient_noise_radius(), 0.0);
        player.update_movement(dt, Vec2::ZERO, false, false, false, &grid, &obstacles);
        assert_eq!(player.ambient_noise_radius(), 0.0);
    }

    #[test]
    fn test_respawn_grants_grace_window() {
        let mut player = Player::at_spawn(Vec2::new(100.0, 100.0));
        player.pos = Vec2::new(400.0, 300.0);
        player.hiding = true;
        player.respawn(Vec2::new(100.0, 100.0));
        assert_eq!(player.pos, Vec2::new(100.0, 100.0));
        assert!(!player.hiding);
        assert!(player.invuln_timer > 0.0);
        assert!(player.concealed());
    }
}
