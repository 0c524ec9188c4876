//! World snapshot and entity types
//!
//! A `WorldState` is a value: the step reads one and returns a fresh one.
//! Everything the renderer and audio layer need to observe lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::events::{AudioSignal, SimEvent};
use crate::Millis;
use crate::config::SimConfig;
use crate::consts::*;

/// Playable area size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Finite and large enough to hold at least one unit
    pub fn is_usable(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= UNIT_WIDTH
            && self.height >= UNIT_HEIGHT
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(360.0, 640.0)
    }
}

/// Movement intent flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFlags {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveFlags {
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Sprite animation state for squad units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    Firing,
}

/// A squad member (top-left anchored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub pos: Vec2,
    pub size: Vec2,
    pub moving: MoveFlags,
    pub last_fire: Option<Millis>,
    pub health: u32,
    pub animation: AnimationState,
    /// Fractional animation frame in `[0, UNIT_FRAME_COUNT)`
    pub frame: f32,
    pub last_anim_update: Millis,
}

impl Unit {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::new(UNIT_WIDTH, UNIT_HEIGHT),
            moving: MoveFlags::default(),
            last_fire: None,
            health: 100,
            animation: AnimationState::Idle,
            frame: 0.0,
            last_anim_update: 0.0,
        }
    }

    pub fn rect(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    /// Where projectiles leave the unit (top center)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y)
    }

    /// Off cooldown for firing at `now`
    pub fn can_fire(&self, now: Millis, cooldown: Millis) -> bool {
        self.last_fire.is_none_or(|t| now - t > cooldown)
    }
}

/// A regular enemy (center anchored, scaled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    pub pos: Vec2,
    pub size: Vec2,
    pub scale: f32,
    /// Distance covered per tick
    pub speed: f32,
    pub health: u32,
    pub last_attack: Option<Millis>,
    pub frame: f32,
    pub last_anim_update: Option<Millis>,
}

impl Zombie {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center_scaled(self.pos, self.size, self.scale)
    }

    /// Radius used for separation and boundary clamping
    pub fn radius(&self) -> f32 {
        self.size.x / 2.0 * self.scale
    }

    pub fn can_attack(&self, now: Millis, cooldown: Millis) -> bool {
        self.last_attack.is_none_or(|t| now - t > cooldown)
    }
}

/// The boss variant: a zombie body with a health pool and an area attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub body: Zombie,
    pub active: bool,
    pub max_health: u32,
    pub current_health: i64,
    /// Squad units removed by one successful attack
    pub eliminations_per_attack: u32,
}

impl Boss {
    pub fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }
}

/// Tagged actor variant used by enemy AI and melee resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Enemy(Zombie),
    Boss(Boss),
}

impl Actor {
    pub fn body(&self) -> &Zombie {
        match self {
            Actor::Enemy(z) => z,
            Actor::Boss(b) => &b.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Zombie {
        match self {
            Actor::Enemy(z) => z,
            Actor::Boss(b) => &mut b.body,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.body().hitbox()
    }
}

/// A player shot (top-left anchored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub size: Vec2,
    /// Unit direction vector
    pub direction: Vec2,
    pub speed: f32,
    pub created_at: Millis,
    /// Recent positions, newest first
    pub trail: Vec<Vec2>,
    /// Glow intensity (1 at spawn, decays toward 0)
    pub glow: f32,
    pub visible: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, direction: Vec2, speed: f32, now: Millis) -> Self {
        Self {
            pos,
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            direction,
            speed,
            created_at: now,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
            glow: 1.0,
            visible: true,
        }
    }

    pub fn rect(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    /// Record current position to trail (call each tick)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Still overlaps the playfield
    pub fn on_screen(&self, bounds: &WorldBounds) -> bool {
        self.pos.y + self.size.y > 0.0
            && self.pos.y < bounds.height
            && self.pos.x + self.size.x > 0.0
            && self.pos.x < bounds.width
    }
}

/// Sign shown on a math block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockPolarity {
    #[default]
    Negative,
    Positive,
}

/// A falling hazard whose value is added to the squad size on contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathBlock {
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels fallen per tick
    pub fall_speed: f32,
    /// Never zero
    pub value: i32,
    pub polarity: BlockPolarity,
    pub last_hit: Option<Millis>,
    /// Positive hits taken; doubles the hit cooldown each time
    pub positive_increments: u32,
}

impl MathBlock {
    pub fn rect(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }
}

/// Complete world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Primary controlled unit; the formation is anchored on it
    pub leader: Unit,
    /// Derived from `squad_size` each tick; index 0 mirrors the leader
    pub squad: Vec<Unit>,
    /// Authoritative unit count
    pub squad_size: i32,
    pub enemies: Vec<Zombie>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub blocks: Vec<MathBlock>,
    pub wave: u32,
    pub score: u64,
    pub last_enemy_spawn: Millis,
    pub last_boss_spawn: Millis,
    pub last_wave_advance: Millis,
    pub last_block_spawn: Millis,
    pub is_running: bool,
    pub is_over: bool,
    pub last_aim_point: Option<Vec2>,
    pub last_aim_time: Option<Millis>,
    pub bounds: WorldBounds,
    /// More units than single-shot sounds can cover; audio should loop
    pub multi_laser_active: bool,
    pub paused_at: Option<Millis>,
    /// Number of steps that advanced this lineage; no-op steps leave it alone
    pub step_count: u64,
    /// What happened during the step that produced this snapshot. A paused
    /// or finished world is returned as-is, so these stay attached until the
    /// next advancing step; use [`WorldState::signal_since`] to replay once.
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl WorldState {
    /// Canonical starting snapshot: one unit, wave 1, empty collections
    pub fn new(bounds: WorldBounds, now: Millis, config: &SimConfig) -> Self {
        let anchor = Vec2::new(
            bounds.width / 2.0 - UNIT_WIDTH / 2.0,
            bounds.height - UNIT_HEIGHT - config.bottom_padding,
        );
        let squad = super::formation::layout(1, anchor.x, anchor.y, &bounds, config)
            .into_iter()
            .map(Unit::at)
            .collect::<Vec<_>>();
        let leader = squad.first().cloned().unwrap_or_else(|| Unit::at(anchor));

        Self {
            leader,
            squad,
            squad_size: 1,
            enemies: Vec::new(),
            boss: None,
            projectiles: Vec::new(),
            blocks: Vec::new(),
            wave: 1,
            score: 0,
            last_enemy_spawn: now,
            last_boss_spawn: now,
            last_wave_advance: now,
            last_block_spawn: now,
            is_running: true,
            is_over: false,
            last_aim_point: None,
            last_aim_time: None,
            bounds,
            multi_laser_active: false,
            paused_at: None,
            step_count: 0,
            events: Vec::new(),
        }
    }

    pub fn boss_active(&self) -> bool {
        self.boss.as_ref().is_some_and(|b| b.active)
    }

    /// Stop advancing; `step` becomes a no-op until resumed
    pub fn paused(&self, now: Millis) -> Self {
        if !self.is_running || self.is_over {
            return self.clone();
        }
        Self {
            is_running: false,
            paused_at: Some(now),
            events: Vec::new(),
            ..self.clone()
        }
    }

    /// Resume and shift every gate timestamp past the paused interval
    pub fn resumed(&self, now: Millis) -> Self {
        let Some(paused_at) = self.paused_at else {
            return self.clone();
        };
        let gap = (now - paused_at).max(0.0);
        let shift = |t: Millis| t + gap;
        let shift_opt = |t: Option<Millis>| t.map(|t| t + gap);

        let mut next = self.clone();
        next.is_running = true;
        next.paused_at = None;
        next.events.clear();
        next.last_enemy_spawn = shift(self.last_enemy_spawn);
        next.last_boss_spawn = shift(self.last_boss_spawn);
        next.last_wave_advance = shift(self.last_wave_advance);
        next.last_block_spawn = shift(self.last_block_spawn);
        next.last_aim_time = shift_opt(self.last_aim_time);
        next.leader.last_fire = shift_opt(self.leader.last_fire);
        for unit in &mut next.squad {
            unit.last_fire = shift_opt(unit.last_fire);
        }
        for enemy in &mut next.enemies {
            enemy.last_attack = shift_opt(enemy.last_attack);
        }
        if let Some(boss) = &mut next.boss {
            boss.body.last_attack = shift_opt(boss.body.last_attack);
        }
        for projectile in &mut next.projectiles {
            projectile.created_at = shift(projectile.created_at);
        }
        for block in &mut next.blocks {
            block.last_hit = shift_opt(block.last_hit);
        }
        log::info!("Resumed after {:.0} ms pause", gap);
        next
    }

    /// Replay this snapshot's events into an audio port
    pub fn signal(&self, sink: &mut impl AudioSignal) {
        for event in &self.events {
            sink.on_event(event, self);
        }
    }

    /// Replay events only if a step advanced the world since `previous`
    pub fn signal_since(&self, previous: &WorldState, sink: &mut impl AudioSignal) {
        if self.step_count != previous.step_count {
            self.signal(sink);
        }
    }

    /// Serialize the render snapshot
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
