//! Observable simulation events
//!
//! The core never plays sounds. Each step records what happened in the
//! returned snapshot; an [`AudioSignal`] implementation decides what to play.

use glam::Vec2;

use super::state::WorldState;

/// Something worth reacting to that happened during one step
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Units fired this tick
    ShotsFired { count: u32 },
    EnemyHit { pos: Vec2 },
    EnemyKilled { pos: Vec2 },
    BossSpawned { index: u32 },
    BossHit { remaining: i64 },
    BossDefeated,
    UnitsLost { count: u32 },
    /// A projectile changed a block's value
    BlockHit { value: i32 },
    /// The squad touched a block
    BlockCollected { value: i32, squad_size: i32 },
    WaveAdvanced { wave: u32 },
    GameOver { score: u64, wave: u32 },
}

/// Port for the audio collaborator
///
/// Every hook defaults to a no-op so implementors only override what they
/// care about.
pub trait AudioSignal {
    fn on_shot_fired(&mut self, _count: u32, _multi_laser: bool) {}
    fn on_hit_scored(&mut self) {}
    fn on_boss_spawned(&mut self) {}
    fn on_boss_defeated(&mut self) {}
    fn on_units_lost(&mut self, _count: u32) {}
    fn on_block_hit(&mut self, _value: i32) {}
    fn on_block_collected(&mut self, _value: i32) {}
    fn on_wave_advanced(&mut self, _wave: u32) {}
    fn on_game_over(&mut self) {}

    /// Route one event to the matching hook
    fn on_event(&mut self, event: &SimEvent, state: &WorldState) {
        match *event {
            SimEvent::ShotsFired { count } => self.on_shot_fired(count, state.multi_laser_active),
            SimEvent::EnemyHit { .. } | SimEvent::EnemyKilled { .. } | SimEvent::BossHit { .. } => {
                self.on_hit_scored()
            }
            SimEvent::BossSpawned { .. } => self.on_boss_spawned(),
            SimEvent::BossDefeated => self.on_boss_defeated(),
            SimEvent::UnitsLost { count } => self.on_units_lost(count),
            SimEvent::BlockHit { value } => self.on_block_hit(value),
            SimEvent::BlockCollected { value, .. } => self.on_block_collected(value),
            SimEvent::WaveAdvanced { wave } => self.on_wave_advanced(wave),
            SimEvent::GameOver { .. } => self.on_game_over(),
        }
    }
}

/// Discards every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSignal for Silent {}
