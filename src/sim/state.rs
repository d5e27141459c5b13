//! Game state and core simulation types
//!
//! Everything the per-tick loop mutates lives in [`GameState`]; the host only
//! reads snapshots and writes input intent.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::particles::{ParticlePool, color};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-start or post-game-over, no simulation advancement
    Idle,
    /// Active gameplay
    Running,
    /// Simulation frozen, only the pause toggle is processed
    Paused,
}

/// The user-controlled ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShip {
    pub pos: Vec2,
    /// Movement intent, -1/0/1, set from input each tick
    pub dir: f32,
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self {
            pos: Vec2::new(FIELD_W / 2.0 - PLAYER_W / 2.0, FIELD_H - 60.0),
            dir: 0.0,
        }
    }
}

impl PlayerShip {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by movement intent, clamped to the field
    pub fn apply_movement(&mut self) {
        self.pos.x = (self.pos.x + self.dir * PLAYER_SPEED).clamp(0.0, FIELD_W - PLAYER_W);
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(PLAYER_W / 2.0, PLAYER_H / 2.0)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_W, PLAYER_H))
    }
}

/// Toughness tier of a formation unit; drives color, score value and boss rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvaderTier {
    /// Lower rows, base color
    Grunt,
    /// Upper half of the grid
    Soldier,
    /// Row zero
    Elite,
    /// Levels ending in 5
    MiniBoss,
    /// Levels divisible by 10
    Boss,
}

impl InvaderTier {
    pub fn score_value(self) -> u32 {
        match self {
            InvaderTier::Grunt => 10,
            InvaderTier::Soldier => 20,
            InvaderTier::Elite => 30,
            InvaderTier::MiniBoss => 250,
            InvaderTier::Boss => 500,
        }
    }

    /// Boss units take their own death effects and skip some damage rules
    pub fn is_boss(self) -> bool {
        matches!(self, InvaderTier::MiniBoss | InvaderTier::Boss)
    }

    /// Particle/sprite palette id
    pub fn color(self) -> u32 {
        match self {
            InvaderTier::Grunt => color::INVADER_LOW,
            InvaderTier::Soldier => color::INVADER_MID,
            InvaderTier::Elite | InvaderTier::MiniBoss => color::INVADER_TOP,
            InvaderTier::Boss => color::BOSS,
        }
    }
}

/// A single formation unit (or oversized boss unit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invader {
    pub pos: Vec2,
    pub size: Vec2,
    pub tier: InvaderTier,
    pub hp: i32,
    pub max_hp: i32,
}

impl Invader {
    pub fn is_boss(&self) -> bool {
        self.tier.is_boss()
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A player bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Set once the pierce upgrade has carried this bullet through a kill
    pub pierced: bool,
}

impl Bullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(BULLET_W, BULLET_H))
    }
}

/// A straight-falling enemy bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
}

impl EnemyBullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(INVADER_BULLET_W, INVADER_BULLET_H))
    }
}

/// A boss missile: aimed at the player's position at spawn time, no re-targeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossMissile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Cached heading for rendering
    pub heading: f32,
}

impl BossMissile {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(BOSS_MISSILE_W, BOSS_MISSILE_H))
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    Shield,
    Double,
    Rocket,
    Pierce,
    Heal,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Shield,
        UpgradeKind::Double,
        UpgradeKind::Rocket,
        UpgradeKind::Pierce,
        UpgradeKind::Heal,
    ];

    pub fn color(self) -> u32 {
        match self {
            UpgradeKind::Shield => color::SHIELD,
            UpgradeKind::Double => color::INVADER_LOW,
            UpgradeKind::Rocket => color::ROCKET,
            UpgradeKind::Pierce => color::PIERCE,
            UpgradeKind::Heal => color::HEAL,
        }
    }

    /// Sprite cache key suffix
    pub fn as_str(self) -> &'static str {
        match self {
            UpgradeKind::Shield => "shield",
            UpgradeKind::Double => "double",
            UpgradeKind::Rocket => "rocket",
            UpgradeKind::Pierce => "pierce",
            UpgradeKind::Heal => "heal",
        }
    }
}

/// A falling power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradePickup {
    pub pos: Vec2,
    pub kind: UpgradeKind,
}

impl UpgradePickup {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(UPGRADE_W, UPGRADE_H))
    }
}

/// A self-guided rocket committed to the lowest formation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Live target point, re-acquired each tick
    pub target: Vec2,
    /// Cumulative distance traveled; gates the homing phase
    pub traveled: f32,
}

impl Rocket {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(ROCKET_W / 2.0, ROCKET_H / 2.0)
    }
}

/// Read-only stats pushed to the UI sink whenever `stats_dirty` is set
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub score: u32,
    pub lives: i32,
    pub level: u32,
    pub shot_count: u32,
    pub player_damage: i32,
    pub shield_hits: u8,
    pub has_shield_system: bool,
    pub rocket_level: u32,
    pub has_pierce: bool,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete run state (the single mutable aggregate the loop advances)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// God-mode modifier: disables player-damage consequences, not enemy damage
    pub debug: bool,

    pub score: u32,
    pub lives: i32,
    pub level: u32,
    pub shot_count: u32,
    pub player_damage: i32,
    pub shield_hits: u8,
    pub has_shield_system: bool,
    /// Tick timestamp of the hit that depleted the shield
    pub shield_lost_at: Option<f64>,
    pub rocket_level: u32,
    pub has_pierce: bool,
    /// Camera shake magnitude, decayed each tick
    pub shake: f32,

    pub player: PlayerShip,
    pub invaders: Vec<Invader>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub boss_missiles: Vec<BossMissile>,
    pub upgrades: Vec<UpgradePickup>,
    pub rockets: Vec<Rocket>,

    /// Shared formation sweep direction (±1) and tracked grid bounding box
    pub sweep_dir: f32,
    pub grid_x: f32,
    pub grid_w: f32,

    /// Cooldown anchors, all in host-supplied monotonic milliseconds
    pub last_player_shot: f64,
    pub last_enemy_shot: f64,
    pub last_boss_shot: f64,
    pub last_rocket: f64,

    /// Set whenever score/lives/level/upgrade state changes; cleared by the host
    pub stats_dirty: bool,

    /// Visual particles (not serialized; pool rebuilt empty on load)
    #[serde(skip)]
    pub particles: ParticlePool,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
}

impl GameState {
    /// Create a fresh idle state with the given seed
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            phase: GamePhase::Idle,
            debug: false,
            score: 0,
            lives: 3,
            level: 1,
            shot_count: 1,
            player_damage: 1,
            shield_hits: 0,
            has_shield_system: false,
            shield_lost_at: None,
            rocket_level: 0,
            has_pierce: false,
            shake: 0.0,
            player: PlayerShip::default(),
            invaders: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            boss_missiles: Vec::new(),
            upgrades: Vec::new(),
            rockets: Vec::new(),
            sweep_dir: 1.0,
            grid_x: GRID_START_X,
            grid_w: 0.0,
            last_player_shot: 0.0,
            last_enemy_shot: 0.0,
            last_boss_shot: 0.0,
            last_rocket: 0.0,
            stats_dirty: true,
            particles: ParticlePool::default(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.player.reset();
        state
    }

    /// Reset every field for a new session; the RNG is re-seeded so a run
    /// replays exactly from (seed, input trace)
    pub fn reset(&mut self) {
        let seed = self.seed;
        *self = Self::new(seed);
    }

    /// Start a session: full reset, first formation, timers anchored to `now`
    pub fn start(&mut self, now: f64) {
        self.reset();
        super::wave::spawn_formation(self);
        self.last_player_shot = now;
        self.last_enemy_shot = now;
        self.last_boss_shot = now;
        self.last_rocket = now;
        self.phase = GamePhase::Running;
        log::info!("Run started (seed {})", self.seed);
    }

    /// Indices of invaders within 2px of the maximum y (the homing target pool)
    pub fn lowest_row_invaders(&self) -> Vec<usize> {
        let Some(lowest_y) = self
            .invaders
            .iter()
            .map(|inv| inv.pos.y)
            .max_by(|a, b| a.total_cmp(b))
        else {
            return Vec::new();
        };
        self.invaders
            .iter()
            .enumerate()
            .filter(|(_, inv)| inv.pos.y >= lowest_y - 2.0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn mark_stats_dirty(&mut self) {
        self.stats_dirty = true;
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            score: self.score,
            lives: self.lives,
            level: self.level,
            shot_count: self.shot_count,
            player_damage: self.player_damage,
            shield_hits: self.shield_hits,
            has_shield_system: self.has_shield_system,
            rocket_level: self.rocket_level,
            has_pierce: self.has_pierce,
        }
    }
}
