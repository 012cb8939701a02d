//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame deltas only
//! - Seeded RNG only, owned by the simulation
//! - No rendering or platform dependencies

pub mod detect;
pub mod effects;
pub mod enemy;
pub mod r#gen;
pub mod grid;
pub mod player;
pub mod raycast;
pub mod score;
pub mod state;
pub mod tick;

pub use effects::{NoiseEvent, ToolCharges, ToolEffect, ToolKind};
pub use enemy::{Archetype, Enemy, EnemyContext};
pub use r#gen::{generate, Keycard, Level, SafeZone, Sample};
pub use grid::{Rect, Tile, TileGrid};
pub use player::Player;
pub use raycast::{cast, line_blocked, vision_fan};
pub use score::{compute_score, par_time, Feat, Rank, ScoreResult};
pub use state::{GameEvent, GamePhase, Metrics, PlayerIntent, Simulation, ToolRequest};
