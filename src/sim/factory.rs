//! Entity construction with wave-scaled stats

use glam::Vec2;

use super::state::{BlockPolarity, Boss, MathBlock, WorldBounds, Zombie};
use crate::config::SimConfig;
use crate::consts::*;
use crate::rng::RandomSource;

/// Regular enemy at a random x just above the top edge
pub fn make_enemy(
    wave: u32,
    bounds: &WorldBounds,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Zombie {
    let wave = wave.max(1);
    let base_speed = config.enemy_base_speed + (wave - 1) as f32 * config.enemy_speed_per_wave;
    let variation = base_speed * config.enemy_speed_jitter;
    let speed = base_speed + rng.range_f32(-1.0, 1.0) * variation;

    Zombie {
        pos: Vec2::new(rng.next_f32() * bounds.width, ENEMY_SPAWN_Y),
        size: Vec2::splat(ENEMY_SIZE),
        scale: config.enemy_min_scale,
        speed,
        health: 1 + wave / config.enemy_health_wave_step.max(1),
        last_attack: None,
        frame: 0.0,
        last_anim_update: None,
    }
}

/// Boss for the `boss_index`-th boss wave (1-based)
///
/// Health and attack size get an additive per-index ramp and then a flat
/// multiplier, so even the first boss lands as a jump in difficulty.
pub fn make_boss(boss_index: u32, bounds: &WorldBounds, config: &SimConfig) -> Boss {
    let step = boss_index.max(1) - 1;
    let health = ((config.boss_initial_health + step as f32 * config.boss_health_per_index)
        * config.boss_health_multiplier)
        .round()
        .max(1.0) as u32;
    let eliminations = ((config.boss_initial_eliminations
        + step as f32 * config.boss_eliminations_per_index)
        * config.boss_damage_multiplier)
        .round()
        .max(1.0) as u32;

    Boss {
        body: Zombie {
            pos: Vec2::new(bounds.width / 2.0, BOSS_SPAWN_Y),
            size: Vec2::splat(BOSS_SIZE),
            scale: config.boss_initial_scale + step as f32 * config.boss_scale_per_index,
            speed: config.boss_speed,
            health,
            last_attack: None,
            frame: 0.0,
            last_anim_update: None,
        },
        active: true,
        max_health: health,
        current_health: health as i64,
        eliminations_per_attack: eliminations,
    }
}

/// Starting value for a math block at `wave`
///
/// Wave 1 draws from the initial range. Later waves grow the magnitude
/// geometrically until it passes the negative threshold, after which the
/// value comes from the fixed capped range.
pub fn block_value(wave: u32, config: &SimConfig, rng: &mut impl RandomSource) -> i32 {
    let value = if wave <= 1 {
        rng.range_i32(config.block_initial_min, config.block_initial_max)
    } else {
        let exponent = (wave - 1).min(i32::MAX as u32) as i32;
        let base = config.block_initial_min as f64
            * (config.block_wave_multiplier as f64).powi(exponent);
        if base <= config.block_negative_threshold as f64 {
            rng.range_i32(config.block_range_start, config.block_range_end)
        } else {
            base.floor() as i32
        }
    };
    if value == 0 { -1 } else { value }
}

/// Math block in the left or right lane at the top edge
pub fn make_math_block(
    wave: u32,
    bounds: &WorldBounds,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> MathBlock {
    let value = block_value(wave, config, rng);
    let width = bounds.width * (1.0 - 2.0 * BLOCK_LANE_PADDING) / 2.0;
    let x = if rng.coin() {
        bounds.width * BLOCK_LANE_PADDING
    } else {
        bounds.width * (1.0 - BLOCK_LANE_PADDING) - width
    };
    let wave_factor = 1.0 + config.block_speed_per_wave * (wave.max(1) - 1) as f32;

    MathBlock {
        pos: Vec2::new(x, 0.0),
        size: Vec2::new(width, BLOCK_HEIGHT),
        fall_speed: config.block_speed * wave_factor,
        value,
        polarity: if value > 0 {
            BlockPolarity::Positive
        } else {
            BlockPolarity::Negative
        },
        last_hit: None,
        positive_increments: 0,
    }
}
