//! Difficulty/wave generator
//!
//! `build_level` is a pure function of the level number: no RNG, so tests can
//! assert exact grid shapes and HP totals per level. The grid grows then
//! saturates; HP follows a repeating four-level ramp where the baseline rises
//! every four levels and the share of tougher rows grows within each block.

use glam::Vec2;

use super::state::{GameState, Invader, InvaderTier};
use crate::consts::*;

/// Oversized singular units spawned above the grid on milestone levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    /// Levels ending in 5: 4x size, 250x tier HP
    Mini,
    /// Levels divisible by 10: 6x size, 500x tier HP
    Full,
}

/// Deterministic description of one level's formation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPlan {
    pub level: u32,
    pub rows: u32,
    pub cols: u32,
    pub base_hp: i32,
    pub higher_hp: i32,
    /// Topmost rows assigned `higher_hp` instead of `base_hp`
    pub rows_with_higher: u32,
    pub boss: Option<BossKind>,
}

/// Derive the formation layout for a level number
pub fn build_level(level: u32) -> LevelPlan {
    let rows = (INVADER_ROWS + level / 2).min(7);
    let cols = (INVADER_COLS + level / 3).min(14);

    let block = (level - 1) / 4;
    let phase = (level - 1) % 4;
    let base_hp = 1 + block as i32;
    let higher_hp = base_hp + 1;
    let rows_with_higher = phase * 2;

    let boss = if level % 10 == 0 {
        Some(BossKind::Full)
    } else if level % 10 == 5 {
        Some(BossKind::Mini)
    } else {
        None
    };

    LevelPlan {
        level,
        rows,
        cols,
        base_hp,
        higher_hp,
        rows_with_higher,
        boss,
    }
}

impl LevelPlan {
    /// The effective per-unit HP tier this level, used for boss HP scaling
    pub fn tier_hp(&self) -> i32 {
        if self.rows_with_higher > 0 {
            self.higher_hp
        } else {
            self.base_hp
        }
    }

    pub fn grid_width(&self) -> f32 {
        self.cols as f32 * (INVADER_W + GRID_GAP) - GRID_GAP
    }

    /// Expand the plan into concrete units: the grid plus the optional boss.
    /// The boss occupies its own slot above the grid; it never replaces
    /// grid invaders.
    pub fn invaders(&self) -> Vec<Invader> {
        let mut out = Vec::with_capacity((self.rows * self.cols) as usize + 1);

        for row in 0..self.rows {
            for col in 0..self.cols {
                let tier = if row == 0 {
                    InvaderTier::Elite
                } else if row < self.rows.div_ceil(2) {
                    InvaderTier::Soldier
                } else {
                    InvaderTier::Grunt
                };
                let hp = if row < self.rows_with_higher {
                    self.higher_hp
                } else {
                    self.base_hp
                };
                out.push(Invader {
                    pos: Vec2::new(
                        GRID_START_X + col as f32 * (INVADER_W + GRID_GAP),
                        GRID_START_Y + row as f32 * (INVADER_H + GRID_GAP),
                    ),
                    size: Vec2::new(INVADER_W, INVADER_H),
                    tier,
                    hp,
                    max_hp: hp,
                });
            }
        }

        if let Some(kind) = self.boss {
            let (scale, tier, hp_mult) = match kind {
                BossKind::Full => (6.0, InvaderTier::Boss, 500),
                BossKind::Mini => (4.0, InvaderTier::MiniBoss, 250),
            };
            let size = Vec2::new(INVADER_W * scale, INVADER_H * scale);
            let hp = self.tier_hp() * hp_mult;
            out.push(Invader {
                pos: Vec2::new(
                    GRID_START_X + self.grid_width() / 2.0 - size.x / 2.0,
                    GRID_START_Y - size.y - GRID_GAP * 2.0,
                ),
                size,
                tier,
                hp,
                max_hp: hp,
            });
        }

        out
    }
}

/// Rebuild the formation for the state's current level
pub fn spawn_formation(state: &mut GameState) {
    let plan = build_level(state.level);
    if let Some(kind) = plan.boss {
        log::info!("Level {}: spawning {:?} boss", state.level, kind);
    }
    state.invaders = plan.invaders();
    state.sweep_dir = 1.0;
    state.grid_x = GRID_START_X;
    state.grid_w = plan.grid_width();
}
