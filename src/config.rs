//! Game balance configuration
//!
//! Every tuning number the simulation reads lives here. The step takes a
//! `&SimConfig` so tests and difficulty presets can swap values freely.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Casual,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Casual => "Casual",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(DifficultyPreset::Casual),
            "normal" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to enemy spawn rate and speed
    pub fn pressure(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 0.75,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Hard => 1.3,
        }
    }

    /// Multiplier applied to boss health and math block severity
    pub fn punishment(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 0.5,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Hard => 1.5,
        }
    }
}

/// Simulation tuning values
///
/// Distances are pixels, speeds are pixels per tick, durations are
/// milliseconds. Partial JSON documents are accepted; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub preset: DifficultyPreset,

    // === Squad & formation ===
    /// Leader movement per tick
    pub leader_speed: f32,
    /// Gap between formation units (both axes)
    pub unit_gap: f32,
    /// Column cap for large squads
    pub max_formation_width: u32,
    /// Leader may not move above this line
    pub top_padding: f32,
    /// Space kept free below the formation
    pub bottom_padding: f32,

    // === Firing ===
    pub shoot_cooldown_ms: f64,
    /// Per-unit, per-tick chance to fire once off cooldown
    pub shoot_chance: f32,
    /// Horizontal jitter half-range for un-aimed shots
    pub aim_jitter: f32,
    /// How long a clicked/tapped aim point stays valid
    pub aim_timeout_ms: f64,

    // === Projectiles ===
    pub projectile_speed: f32,
    pub projectile_max_age_ms: f64,

    // === Regular enemies ===
    pub enemy_base_speed: f32,
    pub enemy_speed_per_wave: f32,
    /// Fractional +/- speed variance at spawn
    pub enemy_speed_jitter: f32,
    pub enemy_min_scale: f32,
    pub enemy_max_scale: f32,
    pub enemy_repulsion: f32,
    pub enemy_attack_cooldown_ms: f64,
    /// Waves per extra point of enemy health
    pub enemy_health_wave_step: u32,
    /// Hits chip away at enemy health instead of killing outright
    pub enemy_health_absorbs_hits: bool,

    // === Boss ===
    pub first_boss_wave: u32,
    pub boss_wave_frequency: u32,
    pub boss_spawn_cooldown_ms: f64,
    pub boss_speed: f32,
    pub boss_initial_health: f32,
    pub boss_health_per_index: f32,
    pub boss_health_multiplier: f32,
    pub boss_initial_eliminations: f32,
    pub boss_eliminations_per_index: f32,
    pub boss_damage_multiplier: f32,
    pub boss_initial_scale: f32,
    pub boss_scale_per_index: f32,
    pub boss_attack_cooldown_ms: f64,

    // === Waves & enemy spawning ===
    pub wave_duration_ms: f64,
    pub enemies_per_wave: f32,
    pub enemies_per_wave_increment: f32,
    pub max_enemies_per_wave: f32,
    /// Waves past this stop raising the spawn rate
    pub spawn_rate_wave_cap: u32,
    pub spawn_fudge: f32,

    // === Math blocks ===
    pub max_blocks: usize,
    pub block_spawn_cooldown_ms: f64,
    /// Flat per-tick chance once the cooldown has elapsed
    pub block_spawn_chance: f32,
    pub block_speed: f32,
    pub block_speed_per_wave: f32,
    pub block_initial_min: i32,
    pub block_initial_max: i32,
    pub block_wave_multiplier: f32,
    /// Once the geometric value passes this, draw from the fixed range instead
    pub block_negative_threshold: i32,
    pub block_range_start: i32,
    pub block_range_end: i32,
    pub block_negative_cooldown_ms: f64,
    pub block_positive_cooldown_ms: f64,
    pub block_cooldown_per_wave: f64,

    // === Scoring ===
    pub enemy_kill_points: u64,
    pub boss_hit_points: u64,
    pub boss_defeat_bonus: u64,
    pub block_hit_points: u64,

    // === Animation ===
    pub unit_frame_ms: f64,
    pub enemy_frame_ms: f64,

    // === Audio intent ===
    /// Above this squad size a looping laser replaces single shots
    pub max_single_sound_units: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Normal,

            leader_speed: 5.0,
            unit_gap: 10.0,
            max_formation_width: 8,
            top_padding: 100.0,
            bottom_padding: 20.0,

            shoot_cooldown_ms: 500.0,
            shoot_chance: 0.1,
            aim_jitter: 0.1,
            aim_timeout_ms: 2000.0,

            projectile_speed: 8.0,
            projectile_max_age_ms: 5000.0,

            enemy_base_speed: 0.8,
            enemy_speed_per_wave: 0.1,
            enemy_speed_jitter: 0.2,
            enemy_min_scale: 1.0,
            enemy_max_scale: 2.5,
            enemy_repulsion: 0.05,
            enemy_attack_cooldown_ms: 1000.0,
            enemy_health_wave_step: 5,
            enemy_health_absorbs_hits: false,

            first_boss_wave: 5,
            boss_wave_frequency: 5,
            boss_spawn_cooldown_ms: 30_000.0,
            boss_speed: 0.6,
            boss_initial_health: 20.0,
            boss_health_per_index: 10.0,
            boss_health_multiplier: 2.0,
            boss_initial_eliminations: 2.0,
            boss_eliminations_per_index: 4.0,
            boss_damage_multiplier: 1.0,
            boss_initial_scale: 3.0,
            boss_scale_per_index: 0.5,
            boss_attack_cooldown_ms: 2000.0,

            wave_duration_ms: 20_000.0,
            enemies_per_wave: 10.0,
            enemies_per_wave_increment: 5.0,
            max_enemies_per_wave: 60.0,
            spawn_rate_wave_cap: 10,
            spawn_fudge: 1.3,

            max_blocks: 3,
            block_spawn_cooldown_ms: 5000.0,
            block_spawn_chance: 0.01,
            block_speed: 1.0,
            block_speed_per_wave: 0.1,
            block_initial_min: -5,
            block_initial_max: -1,
            block_wave_multiplier: 1.5,
            block_negative_threshold: -50,
            block_range_start: -60,
            block_range_end: -30,
            block_negative_cooldown_ms: 100.0,
            block_positive_cooldown_ms: 500.0,
            block_cooldown_per_wave: 0.1,

            enemy_kill_points: 10,
            boss_hit_points: 20,
            boss_defeat_bonus: 1000,
            block_hit_points: 5,

            unit_frame_ms: 100.0,
            enemy_frame_ms: 120.0,

            max_single_sound_units: 5,
        }
    }
}

impl SimConfig {
    /// Create a config from a difficulty preset (applies preset scaling)
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Rescale pressure-dependent fields from the current preset to `preset`
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        let pressure = preset.pressure() / self.preset.pressure();
        let punishment = preset.punishment() / self.preset.punishment();
        self.preset = preset;

        self.enemies_per_wave *= pressure;
        self.enemies_per_wave_increment *= pressure;
        self.max_enemies_per_wave *= pressure;
        self.enemy_base_speed *= pressure;

        self.boss_health_multiplier *= punishment;
        self.block_wave_multiplier = 1.0 + (self.block_wave_multiplier - 1.0) * punishment;
    }

    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} config from {}",
            config.preset.as_str(),
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would stall or corrupt the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("shoot_cooldown_ms", self.shoot_cooldown_ms),
            ("aim_timeout_ms", self.aim_timeout_ms),
            ("projectile_max_age_ms", self.projectile_max_age_ms),
            ("enemy_attack_cooldown_ms", self.enemy_attack_cooldown_ms),
            ("boss_attack_cooldown_ms", self.boss_attack_cooldown_ms),
            ("boss_spawn_cooldown_ms", self.boss_spawn_cooldown_ms),
            ("wave_duration_ms", self.wave_duration_ms),
            ("block_spawn_cooldown_ms", self.block_spawn_cooldown_ms),
            ("block_negative_cooldown_ms", self.block_negative_cooldown_ms),
            ("block_positive_cooldown_ms", self.block_positive_cooldown_ms),
            ("unit_frame_ms", self.unit_frame_ms),
            ("enemy_frame_ms", self.enemy_frame_ms),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be a positive duration, got {value}")));
            }
        }

        let positives = [
            ("leader_speed", self.leader_speed),
            ("projectile_speed", self.projectile_speed),
            ("enemy_base_speed", self.enemy_base_speed),
            ("boss_speed", self.boss_speed),
            ("block_speed", self.block_speed),
            ("enemy_min_scale", self.enemy_min_scale),
            ("boss_initial_scale", self.boss_initial_scale),
            ("boss_initial_health", self.boss_initial_health),
            ("boss_initial_eliminations", self.boss_initial_eliminations),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        let probabilities = [
            ("shoot_chance", self.shoot_chance),
            ("block_spawn_chance", self.block_spawn_chance),
            ("enemy_speed_jitter", self.enemy_speed_jitter),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("must lie in [0, 1], got {value}")));
            }
        }

        if self.enemy_max_scale < self.enemy_min_scale {
            return Err(invalid("enemy_max_scale", "must not be below enemy_min_scale".into()));
        }
        if self.max_formation_width == 0 {
            return Err(invalid("max_formation_width", "must be at least 1".into()));
        }
        if self.boss_wave_frequency == 0 {
            return Err(invalid("boss_wave_frequency", "must be at least 1".into()));
        }
        if self.enemy_health_wave_step == 0 {
            return Err(invalid("enemy_health_wave_step", "must be at least 1".into()));
        }
        if self.block_initial_min > self.block_initial_max || self.block_initial_max >= 0 {
            return Err(invalid(
                "block_initial_max",
                "initial block range must be negative and ordered".into(),
            ));
        }
        if self.block_range_start > self.block_range_end || self.block_range_end >= 0 {
            return Err(invalid(
                "block_range_end",
                "capped block range must be negative and ordered".into(),
            ));
        }
        Ok(())
    }

    /// Boss ordinal for a boss wave (1 for the first boss)
    pub fn boss_wave_index(&self, wave: u32) -> u32 {
        wave.saturating_sub(self.first_boss_wave) / self.boss_wave_frequency.max(1) + 1
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
