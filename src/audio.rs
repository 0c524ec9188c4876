//! Sound cue mapping
//!
//! The simulation only reports what happened. `CueQueue` turns those events
//! into a list of cues for whatever playback backend the host uses.

use crate::sim::events::AudioSignal;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// One short laser shot
    LaserShot,
    /// Start looping laser fire (large squads)
    LaserLoopStart,
    LaserLoopStop,
    /// Projectile hit an enemy or the boss
    Hit,
    /// Boss arrives
    BossRoar,
    BossDefeated,
    /// Squad members eliminated
    UnitLost,
    /// Projectile changed a math block
    BlockHit,
    /// Squad touched a block that helped
    BlockGain,
    /// Squad touched a block that hurt
    BlockLoss,
    WaveStart,
    GameOver,
}

/// A cue ready for playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub effect: SoundEffect,
    pub volume: f32,
}

/// Collects cues from simulation events
#[derive(Debug, Clone)]
pub struct CueQueue {
    cues: Vec<Cue>,
    laser_looping: bool,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for CueQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CueQueue {
    pub fn new() -> Self {
        Self {
            cues: Vec::new(),
            laser_looping: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn is_laser_looping(&self) -> bool {
        self.laser_looping
    }

    /// Take every queued cue
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    fn push(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        self.cues.push(Cue { effect, volume });
    }

    /// Reconcile the loop with the snapshot's laser flag. Call once per step
    /// after replaying events so the loop stops even on ticks without shots.
    pub fn sync_laser_loop(&mut self, multi_laser_active: bool) {
        if self.laser_looping && !multi_laser_active {
            self.laser_looping = false;
            self.push(SoundEffect::LaserLoopStop);
        }
    }
}

impl AudioSignal for CueQueue {
    fn on_shot_fired(&mut self, count: u32, multi_laser: bool) {
        if multi_laser {
            if !self.laser_looping {
                self.laser_looping = true;
                self.push(SoundEffect::LaserLoopStart);
            }
        } else {
            self.sync_laser_loop(false);
            for _ in 0..count {
                self.push(SoundEffect::LaserShot);
            }
        }
    }

    fn on_hit_scored(&mut self) {
        self.push(SoundEffect::Hit);
    }

    fn on_boss_spawned(&mut self) {
        self.push(SoundEffect::BossRoar);
    }

    fn on_boss_defeated(&mut self) {
        self.push(SoundEffect::BossDefeated);
    }

    fn on_units_lost(&mut self, _count: u32) {
        self.push(SoundEffect::UnitLost);
    }

    fn on_block_hit(&mut self, _value: i32) {
        self.push(SoundEffect::BlockHit);
    }

    fn on_block_collected(&mut self, value: i32) {
        self.push(if value > 0 {
            SoundEffect::BlockGain
        } else {
            SoundEffect::BlockLoss
        });
    }

    fn on_wave_advanced(&mut self, _wave: u32) {
        self.push(SoundEffect::WaveStart);
    }

    fn on_game_over(&mut self) {
        self.sync_laser_loop(false);
        self.push(SoundEffect::GameOver);
    }
}
