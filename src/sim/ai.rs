//! Enemy steering
//!
//! Every actor walks toward the nearest squad unit (or the playfield center
//! when the squad is gone). Regular enemies also grow as they close in, push
//! each other apart and are shoved clear of an active boss.

use glam::Vec2;

use super::state::{Actor, Boss, Unit, WorldBounds, Zombie};
use crate::Millis;
use crate::config::SimConfig;
use crate::consts::{ENEMY_FRAME_COUNT, EPSILON};

/// Read-only view of the world used while moving actors
pub struct Surroundings<'a> {
    pub squad: &'a [Unit],
    /// Regular enemies as they stood at the start of the tick
    pub enemies: &'a [Zombie],
    pub boss: Option<&'a Boss>,
    pub bounds: WorldBounds,
    pub now: Millis,
}

impl Surroundings<'_> {
    /// Point the actor at `pos` should walk toward
    fn target_for(&self, pos: Vec2) -> Vec2 {
        self.squad
            .iter()
            .map(|u| u.rect().center())
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)))
            .unwrap_or_else(|| self.bounds.center())
    }

    /// Vertical line the squad stands on; scale reaches its max there
    fn baseline_y(&self) -> f32 {
        self.squad
            .iter()
            .map(|u| u.rect().center().y)
            .reduce(f32::min)
            .unwrap_or(self.bounds.height)
    }

    fn active_boss(&self) -> Option<&Boss> {
        self.boss.filter(|b| b.active)
    }
}

/// Move one actor a single tick. `index` is the enemy's slot in
/// `ctx.enemies` so it can skip itself during separation.
pub fn update_actor(mut actor: Actor, index: Option<usize>, ctx: &Surroundings, config: &SimConfig) -> Actor {
    let body = actor.body_mut();
    let target = ctx.target_for(body.pos);
    let to_target = target - body.pos;
    let distance = to_target.length();
    if distance > EPSILON {
        body.pos += to_target / distance * body.speed.min(distance);
    }

    if let Actor::Enemy(zombie) = &mut actor {
        grow_toward_baseline(zombie, ctx.baseline_y(), config);
        separate(zombie, index, ctx, config);
        if let Some(boss) = ctx.active_boss() {
            push_out_of_boss(zombie, boss);
        }
    }

    let body = actor.body_mut();
    clamp_to_bounds(body, &ctx.bounds);
    animate(body, ctx.now, config.enemy_frame_ms);
    actor
}

/// Scale interpolates with vertical progress and never shrinks
fn grow_toward_baseline(zombie: &mut Zombie, baseline_y: f32, config: &SimConfig) {
    let progress = if baseline_y > EPSILON {
        (zombie.pos.y / baseline_y).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let target = config.enemy_min_scale + (config.enemy_max_scale - config.enemy_min_scale) * progress;
    zombie.scale = zombie.scale.max(target);
}

/// Soft separation proportional to overlap
fn separate(zombie: &mut Zombie, index: Option<usize>, ctx: &Surroundings, config: &SimConfig) {
    let reach = zombie.size.x * zombie.scale;
    let mut push = Vec2::ZERO;
    for (i, other) in ctx.enemies.iter().enumerate() {
        if Some(i) == index {
            continue;
        }
        let away = zombie.pos - other.pos;
        let d = away.length();
        if d > EPSILON && d < reach {
            push += away / d * (reach - d) * config.enemy_repulsion;
        }
    }
    zombie.pos += push;
}

/// Hard separation: place the zombie on the boss's footprint edge
fn push_out_of_boss(zombie: &mut Zombie, boss: &Boss) {
    let min_distance = (zombie.size.x * zombie.scale + boss.body.size.x * boss.body.scale) / 2.0;
    let away = zombie.pos - boss.body.pos;
    let d = away.length();
    if d < min_distance {
        let dir = if d > EPSILON { away / d } else { Vec2::Y };
        zombie.pos = boss.body.pos + dir * min_distance;
    }
}

fn clamp_to_bounds(body: &mut Zombie, bounds: &WorldBounds) {
    let r = body.radius();
    body.pos.x = body.pos.x.min(bounds.width - r).max(r);
    body.pos.y = body.pos.y.min(bounds.height - r).max(r);
}

fn animate(body: &mut Zombie, now: Millis, frame_ms: Millis) {
    let elapsed = body.last_anim_update.map_or(0.0, |t| (now - t).max(0.0));
    let advanced = body.frame as f64 + elapsed / frame_ms;
    body.frame = advanced.rem_euclid(ENEMY_FRAME_COUNT as f64) as f32;
    body.last_anim_update = Some(now);
}

/// Move every regular enemy against the start-of-tick snapshot
pub fn update_enemies(ctx: &Surroundings, config: &SimConfig) -> Vec<Zombie> {
    ctx.enemies
        .iter()
        .enumerate()
        .map(|(i, z)| match update_actor(Actor::Enemy(z.clone()), Some(i), ctx, config) {
            Actor::Enemy(z) => z,
            Actor::Boss(b) => b.body,
        })
        .collect()
}

/// Move the boss if it is still active
pub fn update_boss(ctx: &Surroundings, config: &SimConfig) -> Option<Boss> {
    let boss = ctx.boss?.clone();
    if !boss.active {
        return Some(boss);
    }
    match update_actor(Actor::Boss(boss), None, ctx, config) {
        Actor::Boss(b) => Some(b),
        Actor::Enemy(_) => None,
    }
}
