//! Data-driven score balance
//!
//! Every weight here was tuned by play, not derived. Rank thresholds assume
//! the greedy par heuristic in `sim::score`; changing one without the other
//! shifts the whole rank curve.

/// Starting score pool for a level
pub const SCORE_BASE: f32 = 5000.0;

/// Penalty per elapsed second
pub const TIME_PENALTY: f32 = 12.0;
/// Penalty per detection
pub const DETECTION_PENALTY: f32 = 400.0;
/// Penalty per death
pub const DEATH_PENALTY: f32 = 400.0;
/// Penalty per tool use, indexed by `ToolKind` order
/// (decoy, foam, flash, throwable, shutdown)
pub const TOOL_PENALTY: [f32; 5] = [60.0, 60.0, 80.0, 60.0, 150.0];
/// Penalty per second spent inside a safe zone
pub const SAFE_TIME_PENALTY: f32 = 8.0;
/// Credit per safe zone visited
pub const ZONE_VISIT_CREDIT: f32 = 75.0;

/// Shutdown bonus per archetype (camera cheapest, seeker highest)
pub const CLAMP_BONUS_PATROLLER: f32 = 220.0;
pub const CLAMP_BONUS_SENTRY: f32 = 160.0;
pub const CLAMP_BONUS_SEEKER: f32 = 320.0;
pub const CLAMP_BONUS_SLIME: f32 = 180.0;
pub const CLAMP_BONUS_CAMERA: f32 = 120.0;

/// Feat multipliers
pub const FEAT_GHOST: f32 = 1.5;
pub const FEAT_UNTOUCHED: f32 = 1.3;
pub const FEAT_BLITZ: f32 = 1.4;
pub const FEAT_SILENT: f32 = 1.2;
/// Product of feat multipliers is capped here
pub const MULTIPLIER_CAP: f32 = 3.0;

/// Blitz requires finishing at or under this fraction of par
pub const BLITZ_PAR_FRACTION: f32 = 0.7;
/// Silent requires total emitted noise under `par_time * this`
pub const SILENT_NOISE_PER_PAR_SECOND: f32 = 0.6;

/// Assumed traversal speed for the par tour (px/s)
pub const PAR_SPEED: f32 = 150.0;
/// Aggregate enemy FOV coverage is capped at this fraction of the arena
pub const THREAT_COVERAGE_CAP: f32 = 0.35;
/// Flat par scale for tutorial runs
pub const TUTORIAL_PAR_SCALE: f32 = 1.35;

/// Rank thresholds (final score, descending)
pub const RANK_S: u32 = 5200;
pub const RANK_A: u32 = 4200;
pub const RANK_B: u32 = 3200;
pub const RANK_C: u32 = 2200;
