//! Simulation core
//!
//! All gameplay logic lives here. The step is a value transform:
//! - Snapshot in, snapshot out
//! - Randomness comes from an injected `RandomSource`
//! - Balance numbers come from an injected `SimConfig`
//! - No rendering, input or audio dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod director;
pub mod events;
pub mod factory;
pub mod formation;
pub mod state;
pub mod tick;

pub use collision::{Aabb, intersects};
pub use events::{AudioSignal, SimEvent, Silent};
pub use formation::{Grid, formation_width, layout};
pub use state::{
    Actor, AnimationState, BlockPolarity, Boss, MathBlock, MoveFlags, Projectile, Unit, WorldBounds,
    WorldState, Zombie,
};
pub use tick::{InputIntent, new_game, step};
