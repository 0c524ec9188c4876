//! Wave progression and spawn scheduling
//!
//! Evaluated once per step against the snapshot's gate timestamps. At most one
//! enemy, one boss and one block can appear per tick.

use super::events::SimEvent;
use super::factory::{make_boss, make_enemy, make_math_block};
use super::state::WorldState;
use crate::Millis;
use crate::config::SimConfig;
use crate::rng::RandomSource;

/// Advance the wave counter once the current wave has run its course
pub fn advance_wave(state: &mut WorldState, now: Millis, config: &SimConfig) -> bool {
    if now - state.last_wave_advance > config.wave_duration_ms {
        state.wave += 1;
        state.last_wave_advance = now;
        state.events.push(SimEvent::WaveAdvanced { wave: state.wave });
        log::info!("Wave {} begins", state.wave);
        true
    } else {
        false
    }
}

/// Target regular-enemy spawns per second for `wave`
pub fn enemy_spawn_rate(wave: u32, config: &SimConfig) -> f32 {
    let ramp_wave = wave.clamp(1, config.spawn_rate_wave_cap.max(1));
    let per_wave = (config.enemies_per_wave
        + (ramp_wave - 1) as f32 * config.enemies_per_wave_increment)
        .min(config.max_enemies_per_wave);
    per_wave / (config.wave_duration_ms / 1000.0) as f32
}

/// Chance to spawn one enemy this tick, given time since the last spawn
pub fn enemy_spawn_probability(wave: u32, elapsed_ms: Millis, config: &SimConfig) -> f32 {
    let elapsed_secs = (elapsed_ms.max(0.0) / 1000.0) as f32;
    enemy_spawn_rate(wave, config) * elapsed_secs * config.spawn_fudge
}

/// Boss ordinal if every boss gate is open this tick
pub fn boss_due(state: &WorldState, now: Millis, config: &SimConfig) -> Option<u32> {
    let frequency = config.boss_wave_frequency.max(1);
    let due = state.wave >= config.first_boss_wave
        && state.wave % frequency == 0
        && !state.boss_active()
        && now - state.last_boss_spawn > config.boss_spawn_cooldown_ms;
    due.then(|| config.boss_wave_index(state.wave))
}

/// Blocks appear in bursts: a flat roll once the cap and cooldown allow it
pub fn block_due(
    state: &WorldState,
    now: Millis,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> bool {
    state.blocks.len() < config.max_blocks
        && now - state.last_block_spawn > config.block_spawn_cooldown_ms
        && rng.chance(config.block_spawn_chance)
}

/// Run every spawn gate for this tick
pub fn run(state: &mut WorldState, now: Millis, config: &SimConfig, rng: &mut impl RandomSource) {
    advance_wave(state, now, config);

    let p = enemy_spawn_probability(state.wave, now - state.last_enemy_spawn, config);
    if rng.chance(p) {
        let enemy = make_enemy(state.wave, &state.bounds, config, rng);
        log::debug!("Spawned enemy at x={:.0} speed={:.2}", enemy.pos.x, enemy.speed);
        state.enemies.push(enemy);
        state.last_enemy_spawn = now;
    }

    if let Some(index) = boss_due(state, now, config) {
        let boss = make_boss(index, &state.bounds, config);
        log::info!(
            "Boss #{} spawned on wave {} (hp={}, eliminates {})",
            index,
            state.wave,
            boss.max_health,
            boss.eliminations_per_attack
        );
        state.boss = Some(boss);
        state.last_boss_spawn = now;
        state.events.push(SimEvent::BossSpawned { index });
    }

    if block_due(state, now, config, rng) {
        let block = make_math_block(state.wave, &state.bounds, config, rng);
        log::debug!("Spawned math block {} at x={:.0}", block.value, block.pos.x);
        state.blocks.push(block);
        state.last_block_spawn = now;
    }
}
