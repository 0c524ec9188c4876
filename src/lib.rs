//! Squad Siege - simulation core for a wave-based top-down squad shooter
//!
//! Core modules:
//! - `sim`: Per-frame world update (spawning, formation, combat, enemy AI)
//! - `config`: Data-driven game balance
//! - `rng`: Injectable random sources
//! - `audio`: Sound cue mapping driven by simulation events
//!
//! Rendering, input capture and audio playback live outside this crate. The
//! host turns raw device events into an [`sim::InputIntent`], calls
//! [`sim::step`] once per animation frame and hands the returned snapshot to
//! its renderer.

pub mod audio;
pub mod config;
pub mod rng;
pub mod sim;

pub use config::{ConfigError, DifficultyPreset, SimConfig};
pub use rng::{RandomSource, ScriptedRandom, SimRng};

use glam::Vec2;

/// Fixed geometry and timing constants (not balance knobs)
pub mod consts {
    /// Squad unit sprite size
    pub const UNIT_WIDTH: f32 = 30.0;
    pub const UNIT_HEIGHT: f32 = 30.0;

    /// Regular enemy base size (before scale)
    pub const ENEMY_SIZE: f32 = 15.0;
    /// Spawn height above the top edge (center-anchored)
    pub const ENEMY_SPAWN_Y: f32 = -20.0;

    /// Boss base size (before scale)
    pub const BOSS_SIZE: f32 = 30.0;
    pub const BOSS_SPAWN_Y: f32 = -50.0;

    /// Projectile sprite size
    pub const PROJECTILE_WIDTH: f32 = 4.0;
    pub const PROJECTILE_HEIGHT: f32 = 8.0;
    /// Maximum number of trail points to store per projectile
    pub const TRAIL_LENGTH: usize = 10;
    /// Glow lost per tick
    pub const GLOW_DECAY: f32 = 0.02;

    /// Math block height; width derives from the playfield
    pub const BLOCK_HEIGHT: f32 = 60.0;
    /// Horizontal inset of block lanes as a fraction of playfield width
    pub const BLOCK_LANE_PADDING: f32 = 0.2;

    /// Unit animation
    pub const UNIT_FRAME_COUNT: f32 = 4.0;
    /// Enemy animation
    pub const ENEMY_FRAME_COUNT: f32 = 8.0;

    /// Distances below this are treated as coincident
    pub const EPSILON: f32 = 1e-4;
}

/// Milliseconds of wall-clock time, as reported by the host
pub type Millis = f64;

/// Drop points carrying NaN or infinite coordinates
#[inline]
pub fn sanitize_point(point: Option<Vec2>) -> Option<Vec2> {
    point.filter(|p| p.is_finite())
}

/// Normalize `v`, or return `fallback` when `v` is degenerate
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO || !n.is_finite() {
        fallback
    } else {
        n
    }
}
