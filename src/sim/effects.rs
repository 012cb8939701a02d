//! Tool effects and noise events
//!
//! Five tool kinds, each backed by a bounded charge counter. Spawned effects
//! live in the simulation's effect list and are pruned in place the tick they
//! expire; decoys and stuck throwables re-emit short-lived noise events that
//! agents can hear.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use crate::consts::*;

/// The five limited-charge tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    Decoy,
    Foam,
    Flash,
    Throwable,
    Shutdown,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Decoy,
        ToolKind::Foam,
        ToolKind::Flash,
        ToolKind::Throwable,
        ToolKind::Shutdown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Base allotment restored by keycards and first safe-zone entry
    pub fn base_charges(self) -> u8 {
        match self {
            ToolKind::Decoy => 2,
            ToolKind::Foam => 2,
            ToolKind::Flash => 1,
            ToolKind::Throwable => 2,
            ToolKind::Shutdown => 1,
        }
    }
}

/// Per-tool charge counters. Never go negative; spending at zero is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCharges {
    counts: [u8; 5],
}

impl Default for ToolCharges {
    fn default() -> Self {
        Self::base()
    }
}

impl ToolCharges {
    pub fn base() -> Self {
        let mut counts = [0; 5];
        for kind in ToolKind::ALL {
            counts[kind.index()] = kind.base_charges();
        }
        Self { counts }
    }

    pub fn get(&self, kind: ToolKind) -> u8 {
        self.counts[kind.index()]
    }

    /// Decrement the counter by exactly one; false (and no change) at zero
    pub fn try_spend(&mut self, kind: ToolKind) -> bool {
        let slot = &mut self.counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn refill(&mut self) {
        *self = Self::base();
    }
}

/// An active tool effect. Each variant carries its own bounded lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ToolEffect {
    /// Stationary noisemaker that pulses while alive
    Decoy { pos: Vec2, radius: f32, life: f32, pulse: f32 },
    /// Area that slows any agent inside it
    Foam { pos: Vec2, radius: f32, life: f32 },
    /// Area that blinds any agent inside it
    Flash { pos: Vec2, radius: f32, life: f32 },
    /// Projectile; becomes a stationary noisemaker on first impact
    Throwable { pos: Vec2, vel: Vec2, life: f32, stuck: bool, pulse: f32 },
}

impl ToolEffect {
    pub fn decoy(pos: Vec2) -> Self {
        ToolEffect::Decoy {
            pos,
            radius: DECOY_RADIUS,
            life: DECOY_LIFE,
            pulse: 0.0,
        }
    }

    pub fn foam(pos: Vec2) -> Self {
        ToolEffect::Foam {
            pos,
            radius: FOAM_RADIUS,
            life: FOAM_LIFE,
        }
    }

    pub fn flash(pos: Vec2) -> Self {
        ToolEffect::Flash {
            pos,
            radius: FLASH_RADIUS,
            life: FLASH_LIFE,
        }
    }

    pub fn throwable(pos: Vec2, vel: Vec2) -> Self {
        ToolEffect::Throwable {
            pos,
            vel,
            life: THROW_LIFE,
            stuck: false,
            pulse: 0.0,
        }
    }

    pub fn pos(&self) -> Vec2 {
        match *self {
            ToolEffect::Decoy { pos, .. }
            | ToolEffect::Foam { pos, .. }
            | ToolEffect::Flash { pos, .. }
            | ToolEffect::Throwable { pos, .. } => pos,
        }
    }

    pub fn expired(&self) -> bool {
        match *self {
            ToolEffect::Decoy { life, .. }
            | ToolEffect::Foam { life, .. }
            | ToolEffect::Flash { life, .. }
            | ToolEffect::Throwable { life, .. } => life <= 0.0,
        }
    }
}

/// A short-lived, radius-bounded signal agents can hear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseEvent {
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
}

impl NoiseEvent {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            life: NOISE_EVENT_LIFE,
        }
    }
}

/// Advance effect and noise timers by one tick, integrating throwables
/// against the grid and emitting pulse noise. Expired entries are pruned in
/// place. Returns the number of noise pulses emitted this tick.
pub fn advance(
    effects: &mut Vec<ToolEffect>,
    noise: &mut Vec<NoiseEvent>,
    grid: &TileGrid,
    dt: f32,
) -> u32 {
    let mut pulses = 0;
    let bounds = grid.pixel_size();

    for effect in effects.iter_mut() {
        match effect {
            ToolEffect::Decoy { pos, life, pulse, .. } => {
                *life -= dt;
                *pulse -= dt;
                if *pulse <= 0.0 && *life > 0.0 {
                    noise.push(NoiseEvent::new(*pos, DECOY_RADIUS));
                    *pulse += DECOY_PULSE_PERIOD;
                    pulses += 1;
                }
            }
            ToolEffect::Foam { life, .. } | ToolEffect::Flash { life, .. } => {
                *life -= dt;
            }
            ToolEffect::Throwable {
                pos,
                vel,
                life,
                stuck,
                pulse,
            } => {
                *life -= dt;
                if !*stuck {
                    let next = *pos + *vel * dt;
                    let out_of_bounds =
                        next.x < 0.0 || next.y < 0.0 || next.x >= bounds.x || next.y >= bounds.y;
                    if out_of_bounds || grid.solid_at(next) {
                        // First impact: rest here and start making noise
                        *stuck = true;
                        *vel = Vec2::ZERO;
                        noise.push(NoiseEvent::new(*pos, THROW_NOISE_RADIUS));
                        *pulse = THROW_PULSE_PERIOD;
                        pulses += 1;
                    } else {
                        *pos = next;
                    }
                } else {
                    *pulse -= dt;
                    if *pulse <= 0.0 && *life > 0.0 {
                        noise.push(NoiseEvent::new(*pos, THROW_NOISE_RADIUS));
                        *pulse += THROW_PULSE_PERIOD;
                        pulses += 1;
                    }
                }
            }
        }
    }

    effects.retain(|e| !e.expired());

    for event in noise.iter_mut() {
        event.life -= dt;
    }
    noise.retain(|n| n.life > 0.0);

    pulses
}
