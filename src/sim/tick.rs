//! Simulation step
//!
//! The single entry point that turns one world snapshot into the next.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::{self, Surroundings};
use super::combat;
use super::director;
use super::events::SimEvent;
use super::formation;
use super::state::{AnimationState, MoveFlags, Unit, WorldBounds, WorldState};
use crate::config::SimConfig;
use crate::consts::*;
use crate::rng::RandomSource;
use crate::{Millis, sanitize_point};

/// Normalized player intent for a single step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputIntent {
    pub moving_left: bool,
    pub moving_right: bool,
    pub moving_up: bool,
    pub moving_down: bool,
    /// Fire toward this point (click/tap)
    pub aim_point: Option<Vec2>,
}

impl InputIntent {
    pub fn flags(&self) -> MoveFlags {
        MoveFlags {
            left: self.moving_left,
            right: self.moving_right,
            up: self.moving_up,
            down: self.moving_down,
        }
    }
}

/// Fresh game at `now`
pub fn new_game(bounds: WorldBounds, now: Millis, config: &SimConfig) -> WorldState {
    log::info!("New game ({}x{}, {})", bounds.width, bounds.height, config.preset.as_str());
    WorldState::new(bounds, now, config)
}

/// Advance the world to `now`
///
/// Never mutates `state`. A paused or finished world comes back unchanged.
pub fn step(
    state: &WorldState,
    now: Millis,
    input: &InputIntent,
    bounds: WorldBounds,
    config: &SimConfig,
    rng: &mut impl RandomSource,
) -> WorldState {
    if !state.is_running || state.is_over {
        return state.clone();
    }

    let mut next = state.clone();
    next.events.clear();
    next.step_count += 1;

    // Boundary sanitation
    if next.squad_size < 0 {
        log::warn!("Negative squad size {} clamped to 0", next.squad_size);
        next.squad_size = 0;
    }
    if bounds.is_usable() {
        next.bounds = bounds;
    } else {
        log::warn!("Ignoring unusable bounds {}x{}", bounds.width, bounds.height);
    }
    register_aim(&mut next, input, now);

    let moving = input.flags();
    move_leader(&mut next, moving, config);
    reflow(&mut next, config);

    director::run(&mut next, now, config, rng);

    let aim = live_aim(&next, now, config);
    let (squad, shots) = combat::fire(std::mem::take(&mut next.squad), aim, now, config, rng);
    next.squad = squad;
    if !shots.is_empty() {
        next.events.push(SimEvent::ShotsFired {
            count: shots.len() as u32,
        });
        next.projectiles.extend(shots);
    }

    combat::advance_projectiles(&mut next, now, config);
    combat::resolve_projectile_hits(&mut next, config);
    combat::resolve_enemy_attacks(&mut next, now, config);
    combat::resolve_boss_attack(&mut next, now, config);
    combat::resolve_blocks(&mut next);

    reflow(&mut next, config);
    if next.squad_size <= 0 {
        next.is_over = true;
        next.events.push(SimEvent::GameOver {
            score: next.score,
            wave: next.wave,
        });
        log::info!("Game over on wave {} with score {}", next.wave, next.score);
    }

    let (enemies, boss) = {
        let ctx = Surroundings {
            squad: &next.squad,
            enemies: &next.enemies,
            boss: next.boss.as_ref(),
            bounds: next.bounds,
            now,
        };
        (ai::update_enemies(&ctx, config), ai::update_boss(&ctx, config))
    };
    next.enemies = enemies;
    next.boss = boss;

    next.multi_laser_active = next.squad_size > config.max_single_sound_units;
    animate_squad(&mut next, now, moving, config);
    next
}

fn register_aim(state: &mut WorldState, input: &InputIntent, now: Millis) {
    match sanitize_point(input.aim_point) {
        Some(point) => {
            state.last_aim_point = Some(point);
            state.last_aim_time = Some(now);
        }
        None if input.aim_point.is_some() => {
            log::warn!("Discarding non-finite aim point {:?}", input.aim_point);
        }
        None => {}
    }
}

/// Aim point if it has not expired
fn live_aim(state: &WorldState, now: Millis, config: &SimConfig) -> Option<Vec2> {
    let fresh = state
        .last_aim_time
        .is_some_and(|t| now - t < config.aim_timeout_ms);
    state.last_aim_point.filter(|_| fresh)
}

fn move_leader(state: &mut WorldState, moving: MoveFlags, config: &SimConfig) {
    let mut delta = Vec2::ZERO;
    if moving.left {
        delta.x -= config.leader_speed;
    }
    if moving.right {
        delta.x += config.leader_speed;
    }
    if moving.up {
        delta.y -= config.leader_speed;
    }
    if moving.down {
        delta.y += config.leader_speed;
    }

    let bounds = state.bounds;
    let width = formation::formation_width(state.squad_size, &bounds, config);
    let max_x = (bounds.width - width).max(0.0);
    let max_y = (bounds.height - UNIT_HEIGHT - config.bottom_padding).max(0.0);
    let min_y = config.top_padding.min(max_y);

    let leader = &mut state.leader;
    leader.moving = moving;
    leader.pos = Vec2::new(
        (leader.pos.x + delta.x).clamp(0.0, max_x),
        (leader.pos.y + delta.y).clamp(min_y, max_y),
    );
}

/// Lay the squad out around the leader, keeping each slot's fire clock.
/// The leader then snaps to `squad[0]`, its visual proxy.
fn reflow(state: &mut WorldState, config: &SimConfig) {
    let positions = formation::layout(
        state.squad_size,
        state.leader.pos.x,
        state.leader.pos.y,
        &state.bounds,
        config,
    );
    let previous = std::mem::take(&mut state.squad);
    state.squad = positions
        .into_iter()
        .enumerate()
        .map(|(i, pos)| {
            let mut unit = Unit::at(pos);
            unit.last_fire = previous.get(i).and_then(|u| u.last_fire);
            unit
        })
        .collect();
    if let Some(front) = state.squad.first() {
        state.leader.pos = front.pos;
    }
}

fn animate_squad(state: &mut WorldState, now: Millis, moving: MoveFlags, config: &SimConfig) {
    let leader = &mut state.leader;
    let elapsed = (now - leader.last_anim_update).max(0.0);
    let frame = leader.frame as f64 + elapsed / config.unit_frame_ms;
    leader.frame = frame.rem_euclid(UNIT_FRAME_COUNT as f64) as f32;
    leader.last_anim_update = now;
    leader.last_fire = state.squad.first().and_then(|u| u.last_fire);
    leader.animation = if moving.any() {
        AnimationState::Running
    } else if leader.last_fire.is_some_and(|t| now - t < config.shoot_cooldown_ms) {
        AnimationState::Firing
    } else {
        AnimationState::Idle
    };

    let (animation, frame) = (leader.animation, leader.frame);
    for unit in &mut state.squad {
        unit.moving = moving;
        unit.animation = animation;
        unit.frame = frame;
        unit.last_anim_update = now;
    }
}
