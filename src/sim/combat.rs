//! Firing, projectile flight and every hit the squad deals or takes
//!
//! Resolution runs in a fixed order each tick so a projectile hits at most
//! one thing:
//! 1. projectiles trail, test math blocks, then fly and cull
//! 2. surviving projectiles test enemies, then the boss
//! 3. enemies bite the squad (one unit per enemy per cooldown)
//! 4. the boss sweeps up to `eliminations_per_attack` units per cooldown
//! 5. falling blocks add their value to the squad size on contact
//!
//! Each phase rebuilds the collections it touches.

use glam::Vec2;

use super::events::SimEvent;
use super::state::{BlockPolarity, MathBlock, Projectile, Unit, WorldState};
use crate::config::SimConfig;
use crate::consts::{GLOW_DECAY, PROJECTILE_WIDTH};
use crate::rng::RandomSource;
use crate::{Millis, normalize_or};

/// Direction for a unit firing from `muzzle`
///
/// A live aim point wins; otherwise shots go mostly up with a little
/// horizontal jitter.
pub fn aim_direction(
    muzzle: Vec2,
    aim: Option<Vec2>,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> Vec2 {
    let aimed = aim.map(|target| (target - muzzle).normalize_or_zero());
    match aimed {
        Some(dir) if dir != Vec2::ZERO && dir.is_finite() => dir,
        _ => {
            let jitter = rng.range_f32(-config.aim_jitter, config.aim_jitter);
            normalize_or(Vec2::new(jitter, -1.0), Vec2::NEG_Y)
        }
    }
}

/// Let each eligible unit roll to fire; returns the updated squad and the
/// new projectiles
pub fn fire(
    squad: Vec<Unit>,
    aim: Option<Vec2>,
    now: Millis,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> (Vec<Unit>, Vec<Projectile>) {
    let mut shots = Vec::new();
    let squad = squad
        .into_iter()
        .map(|mut unit| {
            if unit.can_fire(now, config.shoot_cooldown_ms) && rng.chance(config.shoot_chance) {
                let muzzle = unit.muzzle();
                let dir = aim_direction(muzzle, aim, config, rng);
                let origin = Vec2::new(muzzle.x - PROJECTILE_WIDTH / 2.0, muzzle.y);
                shots.push(Projectile::new(origin, dir, config.projectile_speed, now));
                unit.last_fire = Some(now);
            }
            unit
        })
        .collect();
    (squad, shots)
}

/// Hit cooldown for a block: short while negative, doubling per positive hit
pub fn block_cooldown(block: &MathBlock, wave: u32, config: &SimConfig) -> Millis {
    if block.value < 0 {
        config.block_negative_cooldown_ms
    } else {
        let wave_factor = 1.0 + config.block_cooldown_per_wave * (wave.max(1) - 1) as f64;
        let doubling = 2f64.powi(block.positive_increments.min(30) as i32);
        config.block_positive_cooldown_ms * wave_factor * doubling
    }
}

/// Apply a projectile hit to a block. `None` means the hit landed inside the
/// cooldown and was absorbed.
pub fn hit_block(block: &MathBlock, now: Millis, wave: u32, config: &SimConfig) -> Option<MathBlock> {
    let cooldown = block_cooldown(block, wave, config);
    if block.last_hit.is_some_and(|t| now - t <= cooldown) {
        return None;
    }

    let mut next = block.clone();
    next.last_hit = Some(now);
    if next.value >= 0 {
        next.positive_increments += 1;
    }
    next.value += 1;
    // Zero would be a no-op pickup
    if next.value == 0 {
        next.value = 1;
        next.polarity = BlockPolarity::Positive;
        next.positive_increments = 0;
    }
    Some(next)
}

/// Squad size after touching a block; blocks alone never empty the squad
#[inline]
pub fn apply_block_value(squad_size: i32, value: i32) -> i32 {
    squad_size.saturating_add(value).max(1)
}

/// Phase 1: trails, block hits, flight and culling
pub fn advance_projectiles(state: &mut WorldState, now: Millis, config: &SimConfig) {
    let mut blocks = std::mem::take(&mut state.blocks);
    let bounds = state.bounds;
    let mut survivors = Vec::with_capacity(state.projectiles.len());

    for mut projectile in std::mem::take(&mut state.projectiles) {
        projectile.record_trail();

        let rect = projectile.rect();
        if let Some(i) = blocks.iter().position(|b| b.rect().intersects(&rect)) {
            if let Some(updated) = hit_block(&blocks[i], now, state.wave, config) {
                log::debug!("Block hit: {} -> {}", blocks[i].value, updated.value);
                state.score += config.block_hit_points;
                state.events.push(SimEvent::BlockHit {
                    value: updated.value,
                });
                blocks[i] = updated;
            }
            continue;
        }

        projectile.pos += projectile.direction * projectile.speed;
        projectile.glow = (projectile.glow - GLOW_DECAY).max(0.0);

        let age = now - projectile.created_at;
        if age < config.projectile_max_age_ms && projectile.on_screen(&bounds) {
            survivors.push(projectile);
        }
    }

    state.blocks = blocks;
    state.projectiles = survivors;
}

/// Phase 2: projectiles against enemies, then the boss
pub fn resolve_projectile_hits(state: &mut WorldState, config: &SimConfig) {
    let mut enemies = std::mem::take(&mut state.enemies);
    let mut survivors = Vec::with_capacity(state.projectiles.len());

    for projectile in std::mem::take(&mut state.projectiles) {
        let rect = projectile.rect();

        if let Some(i) = enemies.iter().position(|z| z.hitbox().intersects(&rect)) {
            if !config.enemy_health_absorbs_hits || enemies[i].health <= 1 {
                let killed = enemies.remove(i);
                state.score += config.enemy_kill_points;
                state.events.push(SimEvent::EnemyKilled { pos: killed.pos });
            } else {
                enemies[i].health -= 1;
                state.events.push(SimEvent::EnemyHit {
                    pos: enemies[i].pos,
                });
            }
            continue;
        }

        if let Some(boss) = state.boss.as_mut().filter(|b| b.active) {
            if boss.hitbox().intersects(&rect) {
                boss.current_health -= 1;
                state.score += config.boss_hit_points;
                state.events.push(SimEvent::BossHit {
                    remaining: boss.current_health.max(0),
                });
                if boss.current_health <= 0 {
                    boss.active = false;
                    state.score += config.boss_defeat_bonus;
                    state.events.push(SimEvent::BossDefeated);
                    log::info!("Boss defeated on wave {}", state.wave);
                }
                continue;
            }
        }

        survivors.push(projectile);
    }

    state.enemies = enemies;
    state.projectiles = survivors;
}

/// Phase 3: each enemy off cooldown removes the first unit it overlaps
pub fn resolve_enemy_attacks(state: &mut WorldState, now: Millis, config: &SimConfig) {
    let mut squad = std::mem::take(&mut state.squad);
    let mut lost = 0u32;
    let mut enemies = Vec::with_capacity(state.enemies.len());

    for mut enemy in std::mem::take(&mut state.enemies) {
        if enemy.can_attack(now, config.enemy_attack_cooldown_ms) {
            let hitbox = enemy.hitbox();
            if let Some(i) = squad.iter().position(|u| hitbox.intersects(&u.rect())) {
                squad.remove(i);
                lost += 1;
                enemy.last_attack = Some(now);
            }
        }
        enemies.push(enemy);
    }

    state.enemies = enemies;
    state.squad = squad;
    record_losses(state, lost);
}

/// Phase 4: the boss removes up to its elimination count in one sweep
pub fn resolve_boss_attack(state: &mut WorldState, now: Millis, config: &SimConfig) {
    let Some(boss) = state.boss.as_mut().filter(|b| b.active) else {
        return;
    };
    if !boss.body.can_attack(now, config.boss_attack_cooldown_ms) {
        return;
    }

    let hitbox = boss.hitbox();
    let cap = boss.eliminations_per_attack;
    let mut eliminated = 0u32;
    let squad = std::mem::take(&mut state.squad)
        .into_iter()
        .filter(|unit| {
            if eliminated < cap && hitbox.intersects(&unit.rect()) {
                eliminated += 1;
                false
            } else {
                true
            }
        })
        .collect();
    state.squad = squad;

    if eliminated > 0 {
        boss.body.last_attack = Some(now);
        record_losses(state, eliminated);
    }
}

fn record_losses(state: &mut WorldState, lost: u32) {
    if lost == 0 {
        return;
    }
    state.squad_size = state.squad_size.saturating_sub(lost as i32).max(0);
    state.events.push(SimEvent::UnitsLost { count: lost });
    log::debug!("Lost {} unit(s), squad now {}", lost, state.squad_size);
}

/// Phase 5: blocks fall, touch the squad, and leave the screen
pub fn resolve_blocks(state: &mut WorldState) {
    let height = state.bounds.height;
    let mut blocks = Vec::with_capacity(state.blocks.len());

    for mut block in std::mem::take(&mut state.blocks) {
        block.pos.y += block.fall_speed;

        let rect = block.rect();
        let touched = state.squad_size > 0 && state.squad.iter().any(|u| u.rect().intersects(&rect));
        if touched {
            state.squad_size = apply_block_value(state.squad_size, block.value);
            state.events.push(SimEvent::BlockCollected {
                value: block.value,
                squad_size: state.squad_size,
            });
            log::debug!("Collected block {:+}, squad now {}", block.value, state.squad_size);
            continue;
        }

        if block.pos.y <= height {
            blocks.push(block);
        }
    }

    state.blocks = blocks;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::sim::factory::{make_boss, make_enemy, make_math_block};
    use crate::sim::state::WorldBounds;
    use proptest::prelude::*;

    fn world() -> (WorldState, SimConfig) {
        let config = SimConfig::default();
        (WorldState::new(WorldBounds::new(360.0, 640.0), 0.0, &config), config)
    }

    fn block(value: i32) -> MathBlock {
        let config = SimConfig::default();
        let mut b = make_math_block(1, &WorldBounds::new(360.0, 640.0), &config, &mut ScriptedRandom::constant(0.1));
        b.value = value;
        b
    }

    #[test]
    fn test_default_aim_is_mostly_up() {
        let config = SimConfig::default();
        let dir = aim_direction(Vec2::new(100.0, 100.0), None, &config, &mut ScriptedRandom::constant(1.0));
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y < -0.99);
        assert!(dir.x > 0.0);
    }

    #[test]
    fn test_aim_point_direction() {
        let config = SimConfig::default();
        let dir = aim_direction(
            Vec2::new(100.0, 100.0),
            Some(Vec2::new(200.0, 100.0)),
            &config,
            &mut ScriptedRandom::constant(0.5),
        );
        assert!((dir - Vec2::X).length() < 1e-5);

        // Aiming at the muzzle itself falls back to the default
        let dir = aim_direction(
            Vec2::new(100.0, 100.0),
            Some(Vec2::new(100.0, 100.0)),
            &config,
            &mut ScriptedRandom::constant(0.5),
        );
        assert!((dir - Vec2::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_fire_respects_cooldown_and_chance() {
        let config = SimConfig::default();
        let squad = vec![Unit::at(Vec2::new(0.0, 500.0)), Unit::at(Vec2::new(40.0, 500.0))];

        let (squad, shots) = fire(squad, None, 1000.0, &config, &mut ScriptedRandom::constant(0.0));
        assert_eq!(shots.len(), 2);
        assert!(squad.iter().all(|u| u.last_fire == Some(1000.0)));

        // Still cooling down
        let (_, shots) = fire(squad.clone(), None, 1200.0, &config, &mut ScriptedRandom::constant(0.0));
        assert!(shots.is_empty());

        // Off cooldown but the roll fails
        let (_, shots) = fire(squad, None, 2000.0, &config, &mut ScriptedRandom::constant(0.9));
        assert!(shots.is_empty());
    }

    #[test]
    fn test_block_zero_skip() {
        let config = SimConfig::default();
        let b = block(-1);
        let hit = hit_block(&b, 1000.0, 1, &config).unwrap();
        assert_eq!(hit.value, 1);
        assert_eq!(hit.polarity, BlockPolarity::Positive);
        assert_eq!(hit.positive_increments, 0);
    }

    #[test]
    fn test_block_cooldown_absorbs_hits() {
        let config = SimConfig::default();
        let b = hit_block(&block(-3), 1000.0, 1, &config).unwrap();
        assert_eq!(b.value, -2);
        assert!(hit_block(&b, 1050.0, 1, &config).is_none());
        assert_eq!(hit_block(&b, 1101.0, 1, &config).unwrap().value, -1);
    }

    #[test]
    fn test_positive_cooldown_doubles() {
        let config = SimConfig::default();
        let mut b = block(1);
        b.last_hit = Some(0.0);
        assert_eq!(block_cooldown(&b, 1, &config), 500.0);
        let b = hit_block(&b, 600.0, 1, &config).unwrap();
        assert_eq!(b.value, 2);
        assert_eq!(b.positive_increments, 1);
        assert_eq!(block_cooldown(&b, 1, &config), 1000.0);
        assert!(hit_block(&b, 1500.0, 1, &config).is_none());
        assert!(hit_block(&b, 1601.0, 1, &config).is_some());
        // Later waves stretch the base cooldown
        assert!(block_cooldown(&b, 5, &config) > 1000.0);
    }

    #[test]
    fn test_projectile_hitting_block_is_consumed() {
        let (mut state, config) = world();
        let b = block(-4);
        let inside = b.pos + Vec2::new(10.0, 10.0);
        state.blocks.push(b);
        state.projectiles.push(Projectile::new(inside, Vec2::NEG_Y, 8.0, 0.0));

        advance_projectiles(&mut state, 100.0, &config);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.blocks[0].value, -3);
        assert_eq!(state.score, config.block_hit_points);
    }

    #[test]
    fn test_projectile_culled_by_age() {
        let (mut state, config) = world();
        state.projectiles.push(Projectile::new(Vec2::new(180.0, 300.0), Vec2::NEG_Y, 1.0, 0.0));
        advance_projectiles(&mut state, 4999.0, &config);
        assert_eq!(state.projectiles.len(), 1);
        advance_projectiles(&mut state, 5000.0, &config);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_culled_off_screen() {
        let (mut state, config) = world();
        state.projectiles.push(Projectile::new(Vec2::new(180.0, 2.0), Vec2::NEG_Y, 8.0, 0.0));
        advance_projectiles(&mut state, 16.0, &config);
        // y = -6, bottom edge at 2 is still on screen
        assert_eq!(state.projectiles.len(), 1);
        advance_projectiles(&mut state, 32.0, &config);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_one_target_per_projectile() {
        let (mut state, config) = world();
        let mut rng = ScriptedRandom::constant(0.5);
        let mut a = make_enemy(1, &state.bounds, &config, &mut rng);
        let mut b = make_enemy(1, &state.bounds, &config, &mut rng);
        a.pos = Vec2::new(100.0, 100.0);
        b.pos = Vec2::new(101.0, 100.0);
        state.enemies = vec![a, b];
        state.projectiles.push(Projectile::new(Vec2::new(99.0, 98.0), Vec2::NEG_Y, 0.0, 0.0));

        resolve_projectile_hits(&mut state, &config);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_late_wave_enemy_dies_in_one_hit() {
        let (mut state, config) = world();
        state.wave = 5;
        let mut z = make_enemy(5, &state.bounds, &config, &mut ScriptedRandom::constant(0.5));
        z.pos = Vec2::new(180.0, 200.0);
        assert!(z.health > 1);
        state.enemies = vec![z];
        state.projectiles.push(Projectile::new(Vec2::new(178.0, 196.0), Vec2::NEG_Y, 0.0, 0.0));

        resolve_projectile_hits(&mut state, &config);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.score, config.enemy_kill_points);
    }

    #[test]
    fn test_health_absorbing_hits_when_enabled() {
        let (mut state, mut config) = world();
        config.enemy_health_absorbs_hits = true;
        let mut z = make_enemy(5, &state.bounds, &config, &mut ScriptedRandom::constant(0.5));
        z.pos = Vec2::new(180.0, 200.0);
        let health = z.health;
        state.enemies = vec![z];
        state.projectiles.push(Projectile::new(Vec2::new(178.0, 196.0), Vec2::NEG_Y, 0.0, 0.0));

        resolve_projectile_hits(&mut state, &config);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].health, health - 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_boss_hit_and_defeat() {
        let (mut state, config) = world();
        let mut boss = make_boss(1, &state.bounds, &config);
        boss.body.pos = Vec2::new(180.0, 200.0);
        boss.current_health = 2;
        state.boss = Some(boss);

        for _ in 0..2 {
            state.projectiles.push(Projectile::new(Vec2::new(180.0, 200.0), Vec2::NEG_Y, 0.0, 0.0));
        }
        resolve_projectile_hits(&mut state, &config);
        let boss = state.boss.as_ref().unwrap();
        assert!(!boss.active);
        assert_eq!(state.score, 20 + 20 + 1000);
        assert!(state.events.contains(&SimEvent::BossDefeated));
    }

    #[test]
    fn test_enemy_removes_one_unit_per_cooldown() {
        let (mut state, config) = world();
        state.squad_size = 3;
        state.squad = vec![
            Unit::at(Vec2::new(100.0, 500.0)),
            Unit::at(Vec2::new(105.0, 500.0)),
            Unit::at(Vec2::new(300.0, 500.0)),
        ];
        let mut z = make_enemy(1, &state.bounds, &config, &mut ScriptedRandom::constant(0.5));
        z.pos = Vec2::new(115.0, 515.0);
        state.enemies = vec![z];

        resolve_enemy_attacks(&mut state, 5000.0, &config);
        assert_eq!(state.squad_size, 2);
        assert_eq!(state.squad.len(), 2);
        assert_eq!(state.enemies[0].last_attack, Some(5000.0));

        resolve_enemy_attacks(&mut state, 5500.0, &config);
        assert_eq!(state.squad_size, 2);

        resolve_enemy_attacks(&mut state, 6001.0, &config);
        assert_eq!(state.squad_size, 1);
    }

    #[test]
    fn test_boss_aoe_is_capped() {
        let (mut state, config) = world();
        let mut boss = make_boss(1, &state.bounds, &config);
        boss.body.pos = Vec2::new(180.0, 500.0);
        let k = boss.eliminations_per_attack;
        state.boss = Some(boss);
        state.squad_size = 6;
        state.squad = (0..6).map(|i| Unit::at(Vec2::new(160.0 + i as f32, 490.0))).collect();
        assert!((k as usize) < state.squad.len());

        resolve_boss_attack(&mut state, 10_000.0, &config);
        assert_eq!(state.squad.len(), 6 - k as usize);
        assert_eq!(state.squad_size, 6 - k as i32);

        // Same cooldown window: nothing more
        resolve_boss_attack(&mut state, 10_500.0, &config);
        assert_eq!(state.squad_size, 6 - k as i32);

        resolve_boss_attack(&mut state, 12_001.0, &config);
        assert_eq!(state.squad_size, 6 - 2 * k as i32);
    }

    #[test]
    fn test_block_pickup_floor() {
        let (mut state, _config) = world();
        state.squad_size = 3;
        let mut b = block(-10);
        b.pos = state.squad[0].pos;
        b.fall_speed = 0.0;
        state.blocks.push(b);

        resolve_blocks(&mut state);
        assert_eq!(state.squad_size, 1);
        assert!(state.blocks.is_empty());
    }

    #[test]
    fn test_blocks_fall_and_leave() {
        let (mut state, _config) = world();
        let mut b = block(-2);
        b.pos = Vec2::new(0.0, 639.5);
        b.fall_speed = 1.0;
        state.blocks.push(b);
        resolve_blocks(&mut state);
        assert!(state.blocks.is_empty());
    }

    proptest! {
        #[test]
        fn prop_blocks_never_empty_the_squad(
            start in 1i32..200,
            values in proptest::collection::vec(-500i32..500, 0..50),
        ) {
            let mut size = start;
            for v in values {
                size = apply_block_value(size, v);
                prop_assert!(size >= 1);
            }
        }

        #[test]
        fn prop_block_value_never_zero(start in -60i32..-1, hits in 1usize..80) {
            let config = SimConfig::default();
            let mut b = block(start);
            let mut now = 0.0;
            for _ in 0..hits {
                now += 1_000_000.0;
                if let Some(next) = hit_block(&b, now, 1, &config) {
                    b = next;
                }
                prop_assert_ne!(b.value, 0);
            }
        }
    }
}
