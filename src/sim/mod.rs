//! Deterministic game simulation
//!
//! Pure state-in, state-out: no wall-clock reads, no I/O, no rendering. The
//! host calls [`tick`] once per frame with the input intent and a monotonic
//! millisecond timestamp; given the same seed and input trace the run replays
//! exactly.

pub mod collision;
pub mod particles;
pub mod rocket;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::Aabb;
pub use particles::{Particle, ParticlePool};
pub use state::{
    BossMissile, Bullet, EnemyBullet, GamePhase, GameState, Invader, InvaderTier, PlayerShip,
    Rocket, StatsSnapshot, UpgradeKind, UpgradePickup,
};
pub use tick::{TickInput, tick};
pub use wave::{BossKind, LevelPlan, build_level};
