//! Umbra - stealth-simulation core for a top-down avoidance game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, agents, detection, scoring)
//! - `share`: Reversible run-summary share codes
//! - `tuning`: Data-driven score balance
//!
//! Rendering, audio, input capture and save data are external collaborators;
//! this crate mutates state and emits events, nothing else.

pub mod share;
pub mod sim;
pub mod tuning;

pub use share::{decode, encode, ShareSummary};
pub use sim::{generate, GameEvent, GamePhase, Level, PlayerIntent, Simulation};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest delta accepted by a single `simulate` call (seconds).
    /// Frames slower than this advance the world in slow motion rather
    /// than letting agents tunnel through walls.
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Arena tile size in pixels
    pub const TILE: f32 = 32.0;
    /// Arena dimensions in tiles (outer ring is always wall)
    pub const GRID_COLS: usize = 40;
    pub const GRID_ROWS: usize = 24;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 10.0;
    pub const PLAYER_SPEED: f32 = 170.0;
    /// Speed while the stealth toggle is held; movement at or below this
    /// emits no ambient noise
    pub const STEALTH_SPEED: f32 = 88.0;
    pub const DASH_SPEED: f32 = 430.0;
    pub const DASH_DURATION: f32 = 0.18;
    pub const DASH_COOLDOWN: f32 = 1.6;
    /// Post-respawn invulnerability window (seconds)
    pub const RESPAWN_INVULN: f32 = 2.5;
    /// Proximity radius for collecting samples and keycards
    pub const PICKUP_RADIUS: f32 = 22.0;

    /// Ambient noise radius while moving at full speed / while dashing
    pub const MOVE_NOISE_RADIUS: f32 = 150.0;
    pub const DASH_NOISE_RADIUS: f32 = 230.0;
    /// HUD loudness meter rise (while audible) and decay rates, per second
    pub const NOISE_LEVEL_RISE: f32 = 0.9;
    pub const NOISE_LEVEL_DECAY: f32 = 0.45;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 12.0;
    /// Waypoint arrival radius for patrol loops
    pub const WAYPOINT_RADIUS: f32 = 7.0;
    /// Wander target arrival radius for seekers
    pub const WANDER_RADIUS: f32 = 18.0;
    /// Seconds between wander retargets
    pub const WANDER_PERIOD: f32 = 4.0;
    /// Pause after a patroller reaches a waypoint
    pub const PATROL_WAIT: f32 = 0.8;
    /// Pause after a seeker reaches a heard noise
    pub const SEEKER_PAUSE: f32 = 0.6;
    /// Net speed below this (px/s) counts as "stuck"
    pub const STUCK_SPEED: f32 = 12.0;
    pub const STUCK_TIMEOUT: f32 = 2.5;
    /// Slime steering wobble (frequency rad/s, amplitude rad/s)
    pub const SLIME_WOBBLE_FREQ: f32 = 1.7;
    pub const SLIME_WOBBLE_AMP: f32 = 2.4;

    /// Tool defaults
    pub const DECOY_RADIUS: f32 = 190.0;
    pub const DECOY_LIFE: f32 = 7.0;
    pub const DECOY_PULSE_PERIOD: f32 = 0.9;
    pub const FOAM_RADIUS: f32 = 95.0;
    pub const FOAM_LIFE: f32 = 5.0;
    /// Lingering slow applied each tick an agent overlaps foam
    pub const FOAM_SLOW_LINGER: f32 = 0.5;
    pub const FOAM_SLOW_FACTOR: f32 = 0.45;
    pub const FLASH_RADIUS: f32 = 130.0;
    pub const FLASH_LIFE: f32 = 0.35;
    pub const FLASH_BLIND: f32 = 3.2;
    pub const THROW_SPEED: f32 = 380.0;
    pub const THROW_LIFE: f32 = 9.0;
    pub const THROW_NOISE_RADIUS: f32 = 170.0;
    pub const THROW_PULSE_PERIOD: f32 = 1.1;
    pub const SHUTDOWN_RANGE: f32 = 46.0;
    /// Discrete noise event defaults
    pub const NOISE_EVENT_LIFE: f32 = 0.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed angular difference `to - from`, in [-π, π)
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vec(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
