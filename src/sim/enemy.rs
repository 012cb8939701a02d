//! Per-archetype enemy behavior
//!
//! Each enemy is one fixed archetype behind a shared `update(dt, ..)`
//! contract: a common preamble (status timers, area effects, hearing)
//! followed by the archetype's own steering, and a shared collide-and-slide
//! resolution against the obstacle list.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{NoiseEvent, ToolEffect};
use super::grid::{resolve_circle_rect, Rect, TileGrid};
use crate::consts::*;
use crate::{angle_diff, heading_vec, normalize_angle, tuning};

/// Fixed behavior kind; never changes after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// Walks a waypoint loop
    Patroller,
    /// Stationary, sweeps its vision cone
    Sentry,
    /// Chases noise, otherwise patrols or wanders
    Seeker,
    /// Slow sinusoidal wanderer
    Slime,
    /// Stationary sweep, unaffected by ambient light
    Camera,
}

impl Archetype {
    pub fn base_speed(self) -> f32 {
        match self {
            Archetype::Patroller => 70.0,
            Archetype::Seeker => 95.0,
            Archetype::Slime => 48.0,
            Archetype::Sentry | Archetype::Camera => 0.0,
        }
    }

    pub fn fov_half(self) -> f32 {
        match self {
            Archetype::Patroller => 0.45,
            Archetype::Sentry => 0.55,
            Archetype::Seeker => 0.50,
            Archetype::Slime => 0.70,
            Archetype::Camera => 0.38,
        }
    }

    pub fn view_range(self) -> f32 {
        match self {
            Archetype::Patroller => 210.0,
            Archetype::Sentry => 240.0,
            Archetype::Seeker => 180.0,
            Archetype::Slime => 120.0,
            Archetype::Camera => 300.0,
        }
    }

    /// Steering rate for walkers, sweep rate for the stationary kinds
    pub fn turn_rate(self) -> f32 {
        match self {
            Archetype::Patroller => 2.6,
            Archetype::Sentry => 0.9,
            Archetype::Seeker => 3.2,
            Archetype::Slime => 1.8,
            Archetype::Camera => 0.6,
        }
    }

    /// Effective vision ignores ambient light only for cameras
    pub fn light_independent(self) -> bool {
        matches!(self, Archetype::Camera)
    }

    /// Shutdown-tool score bonus for removing this archetype
    pub fn clamp_bonus(self) -> f32 {
        match self {
            Archetype::Patroller => tuning::CLAMP_BONUS_PATROLLER,
            Archetype::Sentry => tuning::CLAMP_BONUS_SENTRY,
            Archetype::Seeker => tuning::CLAMP_BONUS_SEEKER,
            Archetype::Slime => tuning::CLAMP_BONUS_SLIME,
            Archetype::Camera => tuning::CLAMP_BONUS_CAMERA,
        }
    }
}

/// Read access handed to every enemy update
pub struct EnemyContext<'a> {
    pub grid: &'a TileGrid,
    pub obstacles: &'a [Rect],
    pub player_pos: Vec2,
    /// Radius of the player's implicit movement noise; 0 when quiet
    pub player_noise_radius: f32,
    pub effects: &'a [ToolEffect],
    pub noise: &'a [NoiseEvent],
    pub ambient_light: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub archetype: Archetype,
    pub pos: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub fov_half: f32,
    pub view_range: f32,
    pub turn_rate: f32,
    pub blind_timer: f32,
    pub slow_timer: f32,
    pub waypoints: Vec<Vec2>,
    pub waypoint: usize,
    pub wait_timer: f32,
    pub heard: Option<Vec2>,
    pub wander_target: Option<Vec2>,
    pub wander_timer: f32,
    pub stuck_timer: f32,
    /// Accumulated lifetime, drives the slime steering term
    pub age: f32,
    pub wobble_phase: f32,
}

impl Enemy {
    pub fn new(archetype: Archetype, pos: Vec2, heading: f32, wobble_phase: f32) -> Self {
        Self {
            archetype,
            pos,
            heading,
            speed: archetype.base_speed(),
            fov_half: archetype.fov_half(),
            view_range: archetype.view_range(),
            turn_rate: archetype.turn_rate(),
            blind_timer: 0.0,
            slow_timer: 0.0,
            waypoints: Vec::new(),
            waypoint: 0,
            wait_timer: 0.0,
            heard: None,
            wander_target: None,
            wander_timer: 0.0,
            stuck_timer: 0.0,
            age: 0.0,
            wobble_phase,
        }
    }

    pub fn blinded(&self) -> bool {
        self.blind_timer > 0.0
    }

    /// Vision range after light scaling (cameras ignore light)
    pub fn effective_range(&self, ambient_light: f32) -> f32 {
        if self.archetype.light_independent() {
            self.view_range
        } else {
            self.view_range * (0.55 + 0.45 * ambient_light)
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut Pcg32, ctx: &EnemyContext) {
        self.age += dt;
        self.blind_timer = (self.blind_timer - dt).max(0.0);
        self.slow_timer = (self.slow_timer - dt).max(0.0);
        self.apply_area_effects(ctx);
        self.heard = self.hear(ctx);

        match self.archetype {
            Archetype::Sentry | Archetype::Camera => {
                self.heading = (self.heading + self.turn_rate * dt).rem_euclid(TAU);
            }
            Archetype::Patroller => self.follow_patrol(dt, ctx),
            Archetype::Seeker => {
                if self.wait_timer > 0.0 {
                    self.wait_timer -= dt;
                } else if let Some(target) = self.heard {
                    self.steer_and_advance(target, dt, ctx);
                    if (target - self.pos).length() <= WANDER_RADIUS {
                        self.heard = None;
                        self.wait_timer = SEEKER_PAUSE;
                    }
                } else if !self.waypoints.is_empty() {
                    self.follow_patrol(dt, ctx);
                } else {
                    self.wander(dt, rng, ctx);
                }
            }
            Archetype::Slime => {
                let steer =
                    (self.age * SLIME_WOBBLE_FREQ + self.wobble_phase).sin() * SLIME_WOBBLE_AMP;
                self.heading = normalize_angle(self.heading + steer * dt);
                self.advance(dt, ctx);
            }
        }
    }

    /// Foam slows, flash blinds; both re-applied every tick of overlap
    fn apply_area_effects(&mut self, ctx: &EnemyContext) {
        for effect in ctx.effects {
            match *effect {
                ToolEffect::Foam { pos, radius, .. } => {
                    if (pos - self.pos).length() <= radius {
                        self.slow_timer = self.slow_timer.max(FOAM_SLOW_LINGER);
                    }
                }
                ToolEffect::Flash { pos, radius, .. } => {
                    if (pos - self.pos).length() <= radius {
                        self.blind_timer = self.blind_timer.max(FLASH_BLIND);
                    }
                }
                _ => {}
            }
        }
    }

    /// Nearest in-range noise source: decoys, stuck throwables, discrete
    /// events, and the player's own movement noise. Ties go to the nearest.
    fn hear(&self, ctx: &EnemyContext) -> Option<Vec2> {
        let mut best: Option<(f32, Vec2)> = None;
        let consider = |source: Vec2, radius: f32, best: &mut Option<(f32, Vec2)>| {
            let d = (source - self.pos).length();
            if d <= radius && best.map_or(true, |(bd, _)| d < bd) {
                *best = Some((d, source));
            }
        };
        for effect in ctx.effects {
            match *effect {
                ToolEffect::Decoy { pos, radius, .. } => consider(pos, radius, &mut best),
                ToolEffect::Throwable { pos, stuck: true, .. } => {
                    consider(pos, THROW_NOISE_RADIUS, &mut best);
                }
                _ => {}
            }
        }
        for event in ctx.noise {
            consider(event.pos, event.radius, &mut best);
        }
        if ctx.player_noise_radius > 0.0 {
            consider(ctx.player_pos, ctx.player_noise_radius, &mut best);
        }
        best.map(|(_, pos)| pos)
    }

    fn follow_patrol(&mut self, dt: f32, ctx: &EnemyContext) {
        if self.waypoints.is_empty() {
            return;
        }
        if self.wait_timer > 0.0 {
            self.wait_timer -= dt;
            return;
        }
        // Clamp a corrupted index instead of panicking
        self.waypoint %= self.waypoints.len();
        let target = self.waypoints[self.waypoint];
        self.steer_and_advance(target, dt, ctx);
        let arrived = (target - self.pos).length() <= WAYPOINT_RADIUS;
        if arrived || self.stuck_timer >= STUCK_TIMEOUT {
            self.waypoint = (self.waypoint + 1) % self.waypoints.len();
            self.wait_timer = PATROL_WAIT;
            self.stuck_timer = 0.0;
        }
    }

    fn wander(&mut self, dt: f32, rng: &mut Pcg32, ctx: &EnemyContext) {
        self.wander_timer -= dt;
        let retarget = match self.wander_target {
            None => true,
            Some(target) => {
                self.wander_timer <= 0.0 || (target - self.pos).length() <= WANDER_RADIUS
            }
        };
        if retarget {
            self.wander_target = Some(random_open_point(rng, ctx.grid).unwrap_or(self.pos));
            self.wander_timer = WANDER_PERIOD;
        }
        if let Some(target) = self.wander_target {
            self.steer_and_advance(target, dt, ctx);
        }
    }

    /// Turn toward `target` at a bounded rate, then move
    fn steer_and_advance(&mut self, target: Vec2, dt: f32, ctx: &EnemyContext) {
        let to_target = target - self.pos;
        if to_target.length_squared() > 1e-6 {
            let desired = to_target.y.atan2(to_target.x);
            let delta = angle_diff(self.heading, desired);
            let max_delta = self.turn_rate * dt;
            self.heading = normalize_angle(self.heading + delta.clamp(-max_delta, max_delta));
        }
        self.advance(dt, ctx);
    }

    fn advance(&mut self, dt: f32, ctx: &EnemyContext) {
        let factor = if self.slow_timer > 0.0 {
            FOAM_SLOW_FACTOR
        } else {
            1.0
        };
        let before = self.pos;
        let delta = heading_vec(self.heading) * self.speed * factor * dt;
        self.pos = move_and_collide(self.pos, ENEMY_RADIUS, delta, ctx.grid, ctx.obstacles);
        if dt > 0.0 && (self.pos - before).length() < STUCK_SPEED * dt {
            self.stuck_timer += dt;
        } else {
            self.stuck_timer = 0.0;
        }
    }
}

/// Shared movement resolution: clamp the proposed position to world bounds,
/// then push out of every overlapping obstacle along the axis of minimum
/// penetration.
pub fn move_and_collide(
    pos: Vec2,
    radius: f32,
    delta: Vec2,
    grid: &TileGrid,
    obstacles: &[Rect],
) -> Vec2 {
    let bounds = grid.pixel_size();
    let mut next = (pos + delta).clamp(Vec2::splat(radius), bounds - Vec2::splat(radius));
    for rect in obstacles {
        if let Some(fixed) = resolve_circle_rect(next, radius, rect) {
            next = fixed;
        }
    }
    next
}

/// Random open-cell center, bounded tries; `None` when luck runs out
pub fn random_open_point(rng: &mut Pcg32, grid: &TileGrid) -> Option<Vec2> {
    for _ in 0..12 {
        let col = rng.random_range(1..grid.cols as i32 - 1);
        let row = rng.random_range(1..grid.rows as i32 - 1);
        if grid.is_open(col, row) {
            return Some(TileGrid::cell_center(col, row));
        }
    }
    None
}
