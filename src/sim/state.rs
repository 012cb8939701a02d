//! Simulation state and lifecycle
//!
//! `Simulation` owns everything a run touches: the generated level, the
//! player, live effects and noise, tool charges, metrics and the phase
//! machine. There is no global world state - callers thread this object
//! into every tick, and several simulations can coexist deterministically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{NoiseEvent, ToolCharges, ToolEffect, ToolKind};
use super::enemy::Archetype;
use super::r#gen::{generate, hash_seed, Level};
use super::player::Player;
use super::score;

/// Level/run state machine. Respawn is not a phase: detection resolves to a
/// same-tick respawn and the run stays `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Built but not started; `simulate` is a no-op
    Idle,
    Running,
    /// All objectives met and exit entered
    LevelComplete,
}

/// Run-scoped counters. Reset on advancing to a new level; optionally
/// preserved across a same-level retry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub elapsed: f32,
    pub detections: u32,
    pub deaths: u32,
    /// Indexed by `ToolKind` order
    pub tool_uses: [u32; 5],
    pub noise_emitted: f32,
    pub safe_time: f32,
    pub distance: f32,
    pub dash_count: u32,
    pub clamp_bonus: f32,
    pub par_time: f32,
    pub path_len: f32,
}

/// Discrete events emitted by `simulate` for the rendering/audio/HUD layers.
/// The core never draws or plays sound itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Pickup { pos: Vec2 },
    ZoneUnlocked { hue: f32 },
    Detected { by: Archetype },
    LevelComplete,
    ToolUsed { kind: ToolKind },
    EnemyClamped { archetype: Archetype },
}

/// Per-tick intent snapshot from the (external) input collector
#[derive(Debug, Clone, Default)]
pub struct PlayerIntent {
    pub move_dir: Vec2,
    pub stealth: bool,
    pub hide: bool,
    pub dash: bool,
    pub tool: Option<ToolRequest>,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolRequest {
    pub kind: ToolKind,
    pub aim: Option<Vec2>,
}

pub struct Simulation {
    pub seed: String,
    pub level_index: u32,
    pub tutorial: bool,
    pub level: Level,
    pub player: Player,
    pub effects: Vec<ToolEffect>,
    pub noise: Vec<NoiseEvent>,
    pub charges: ToolCharges,
    pub metrics: Metrics,
    pub phase: GamePhase,
    /// Decaying aggregate loudness; UI feedback only
    pub noise_level: f32,
    /// Run-time randomness (wander targets); seeded from (seed, level) on a
    /// separate stream from the generator
    pub(crate) rng: Pcg32,
}

impl Simulation {
    /// Build a fresh simulation. An empty or whitespace seed is substituted
    /// with a freshly generated random one - never treated as an error.
    pub fn new(seed: &str, tutorial: bool) -> Self {
        let seed = sanitize_seed(seed);
        Self::build(seed, 1, tutorial, Metrics::default())
    }

    fn build(seed: String, level_index: u32, tutorial: bool, mut metrics: Metrics) -> Self {
        let level = generate(&seed, level_index, tutorial);
        metrics.path_len = score::tour_length(&level);
        metrics.par_time = score::par_time(&level);
        let rng = run_rng(&seed, level_index);
        let player = Player::at_spawn(level.spawn);
        log::info!(
            "level {level_index} ready (seed {seed:?}, par {:.1}s)",
            metrics.par_time
        );
        Self {
            seed,
            level_index,
            tutorial,
            level,
            player,
            effects: Vec::new(),
            noise: Vec::new(),
            charges: ToolCharges::base(),
            metrics,
            phase: GamePhase::Idle,
            noise_level: 0.0,
            rng,
        }
    }

    pub fn start(&mut self) {
        if self.phase == GamePhase::Idle {
            self.phase = GamePhase::Running;
        }
    }

    /// Rebuild the current level from the generator. Transient state is
    /// discarded; metrics survive only when `keep_metrics` is set.
    pub fn restart_level(&mut self, keep_metrics: bool) {
        let metrics = if keep_metrics {
            self.metrics.clone()
        } else {
            Metrics::default()
        };
        *self = Self::build(self.seed.clone(), self.level_index, self.tutorial, metrics);
        self.phase = GamePhase::Running;
    }

    /// Move on to the next level; metrics always reset
    pub fn advance_level(&mut self) {
        *self = Self::build(
            self.seed.clone(),
            self.level_index + 1,
            self.tutorial,
            Metrics::default(),
        );
        self.phase = GamePhase::Running;
    }

    /// Change the seed and start over from level 1
    pub fn set_seed(&mut self, seed: &str) {
        let seed = sanitize_seed(seed);
        *self = Self::build(seed, 1, self.tutorial, Metrics::default());
    }

    /// Score the run as it stands now
    pub fn score(&self) -> score::ScoreResult {
        score::compute_score(&self.metrics, &self.level)
    }
}

fn run_rng(seed: &str, level_index: u32) -> Pcg32 {
    let base = (u64::from(hash_seed(seed)) << 32) | u64::from(level_index.wrapping_add(1));
    Pcg32::seed_from_u64(base ^ 0x9e37_79b9_7f4a_7c15)
}

/// Empty seeds become a random 8-character code; anything else is trimmed
/// and used as-is
fn sanitize_seed(seed: &str) -> String {
    let trimmed = seed.trim();
    if trimmed.is_empty() {
        let mut rng = rand::rng();
        (0..8)
            .map(|_| char::from(rng.sample(rand::distr::Alphanumeric)))
            .collect()
    } else {
        trimmed.to_string()
    }
}
