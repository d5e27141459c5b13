//! Neon Invaders - a canvas Space-Invaders variant
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, difficulty curve)
//! - `render`: Canvas2D presentation of a state snapshot (wasm only)
//! - `ui`: DOM stats sink and screen chrome (wasm only)
//! - `highscores`: Top-3 leaderboard persisted to LocalStorage
//! - `settings`: Presentation preferences

pub mod highscores;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod render;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (canvas logical size)
    pub const FIELD_W: f32 = 800.0;
    pub const FIELD_H: f32 = 600.0;

    /// Player ship
    pub const PLAYER_W: f32 = 40.0;
    pub const PLAYER_H: f32 = 24.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    pub const PLAYER_SHOOT_COOLDOWN_MS: f64 = 200.0;

    /// Player bullets (dy per tick; negative = upward)
    pub const BULLET_W: f32 = 4.0;
    pub const BULLET_H: f32 = 12.0;
    pub const BULLET_SPEED: f32 = -10.0;
    /// Horizontal spacing between parallel shots
    pub const SHOT_SPREAD: f32 = 14.0;

    /// Formation grid
    pub const INVADER_W: f32 = 36.0;
    pub const INVADER_H: f32 = 24.0;
    pub const INVADER_ROWS: u32 = 5;
    pub const INVADER_COLS: u32 = 11;
    pub const GRID_GAP: f32 = 8.0;
    pub const GRID_START_X: f32 = 80.0;
    pub const GRID_START_Y: f32 = 80.0;
    /// Sweep reverses before the grid would cross this distance from either edge
    pub const SWEEP_MARGIN: f32 = 40.0;
    pub const DESCENT_STEP: f32 = 20.0;

    /// Enemy fire
    pub const INVADER_BULLET_W: f32 = 6.0;
    pub const INVADER_BULLET_H: f32 = 10.0;
    pub const INVADER_BULLET_SPEED: f32 = 4.0;
    pub const INVADER_SHOOT_INTERVAL_BASE_MS: f64 = 1000.0;
    pub const INVADER_SHOOT_INTERVAL_MIN_MS: f64 = 350.0;

    /// Boss aimed missiles
    pub const BOSS_MISSILE_W: f32 = 8.0;
    pub const BOSS_MISSILE_H: f32 = 16.0;
    pub const BOSS_MISSILE_SPEED: f32 = 5.0;
    pub const BOSS_SHOOT_INTERVAL_MS: f64 = 3000.0;

    /// Upgrade pickups
    pub const UPGRADE_W: f32 = 24.0;
    pub const UPGRADE_H: f32 = 24.0;
    pub const UPGRADE_FALL_SPEED: f32 = 3.0;
    pub const DROP_CHANCE: f32 = 0.18;

    /// Upgrade caps
    pub const SHOT_COUNT_CAP: u32 = 4;
    pub const DAMAGE_CAP: i32 = 5;
    pub const ROCKET_LEVEL_CAP: u32 = 5;
    pub const LIVES_CAP: i32 = 5;

    pub const SHIELD_RECHARGE_MS: f64 = 5000.0;

    /// Homing rockets
    pub const ROCKET_W: f32 = 10.0;
    pub const ROCKET_H: f32 = 24.0;
    pub const ROCKET_INITIAL_SPEED: f32 = 1.0;
    pub const ROCKET_MAX_SPEED: f32 = 9.0;
    pub const ROCKET_THRUST: f32 = 0.25;
    pub const ROCKET_STEER_STRENGTH: f32 = 0.12;
    /// Distance flown straight up before homing guidance engages
    pub const ROCKET_VERTICAL_PHASE: f32 = 55.0;
    pub const ROCKET_HIT_RADIUS: f32 = 28.0;
    pub const ROCKET_INTERVAL_MS: f64 = 5000.0;

    /// Particle effects
    pub const EXPLOSION_PARTICLES: usize = 18;
    pub const PARTICLE_MAX_SIZE: f32 = 14.0;
    pub const PARTICLE_LIFE: u32 = 28;
    pub const PARTICLE_SPEED: f32 = 5.0;
    pub const ROCKET_TRAIL_SIZE: f32 = 5.0;
    pub const ROCKET_TRAIL_LIFE: u32 = 14;
    pub const ROCKET_TRAIL_DRAG: f32 = 0.25;
}
