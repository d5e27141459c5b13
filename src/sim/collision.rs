//! AABB overlap tests and the per-tick combat resolver
//!
//! All hit detection is axis-aligned box overlap, resolved once per tick in a
//! fixed order: player bullets vs invaders, enemy bullets vs player, boss
//! missiles vs player.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::particles::color;
use super::state::{GameState, Invader, UpgradeKind, UpgradePickup};
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict overlap: boxes that merely touch edges do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.pos.x + self.size.x > other.pos.x
            && self.pos.x < other.pos.x + other.size.x
            && self.pos.y + self.size.y > other.pos.y
            && self.pos.y < other.pos.y + other.size.y
    }
}

/// Upgrade kinds currently worth dropping, given the run's caps
pub fn eligible_upgrades(state: &GameState) -> Vec<UpgradeKind> {
    UpgradeKind::ALL
        .iter()
        .copied()
        .filter(|kind| match kind {
            UpgradeKind::Shield => !state.has_shield_system,
            UpgradeKind::Double => {
                state.shot_count < SHOT_COUNT_CAP || state.player_damage < DAMAGE_CAP
            }
            UpgradeKind::Rocket => state.rocket_level < ROCKET_LEVEL_CAP,
            UpgradeKind::Pierce => !state.has_pierce,
            UpgradeKind::Heal => state.lives < LIVES_CAP,
        })
        .collect()
}

/// One drop roll at a death position. Skipped entirely when the roll misses
/// or no kind is currently useful.
pub(crate) fn spawn_upgrade(state: &mut GameState, pos: Vec2) {
    if state.rng.random::<f32>() >= DROP_CHANCE {
        return;
    }
    let eligible = eligible_upgrades(state);
    if eligible.is_empty() {
        return;
    }
    let kind = eligible[state.rng.random_range(0..eligible.len())];
    state.upgrades.push(UpgradePickup {
        pos: Vec2::new(pos.x + INVADER_W / 2.0 - UPGRADE_W / 2.0, pos.y),
        kind,
    });
}

/// Three drop rolls spread across a dead boss's bounding box
pub(crate) fn boss_drop_rolls(state: &mut GameState, inv: &Invader) {
    let mid_y = inv.pos.y + inv.size.y / 2.0;
    spawn_upgrade(state, Vec2::new(inv.pos.x + inv.size.x / 4.0, mid_y));
    spawn_upgrade(state, Vec2::new(inv.pos.x + inv.size.x * 0.75, mid_y));
    spawn_upgrade(state, Vec2::new(inv.pos.x + inv.size.x / 2.0, mid_y));
}

/// Death side effects for a unit killed by plain bullet fire.
/// The invader must already be removed from the formation.
pub(crate) fn on_bullet_kill(state: &mut GameState, inv: &Invader) {
    use std::f32::consts::TAU;

    state.score += inv.tier.score_value();
    if inv.is_boss() {
        state.shake = 30.0;
        state
            .particles
            .spawn_stunning_explosion(inv.center(), inv.tier.color(), &mut state.rng);
        boss_drop_rolls(state, inv);
    } else {
        state
            .particles
            .spawn_explosion(inv.center(), inv.tier.color(), 0.0, TAU, 0.0, &mut state.rng);
        spawn_upgrade(state, inv.pos);
    }
    state.mark_stats_dirty();
}

/// Shared player-hit resolution for enemy bullets and boss missiles
fn hit_player(state: &mut GameState, now: f64) {
    use std::f32::consts::PI;

    state.shake = 15.0;
    state.particles.spawn_explosion(
        state.player.center(),
        color::PLAYER,
        PI,
        PI,
        0.0,
        &mut state.rng,
    );
    if state.shield_hits > 0 {
        state.shield_hits = 0;
        state.shield_lost_at = Some(now);
    } else {
        state.lives -= 1;
    }
    state.mark_stats_dirty();
}

/// Run all combat checks for this tick
pub fn resolve_combat(state: &mut GameState, now: f64) {
    resolve_player_bullets(state);
    resolve_incoming_fire(state, now);
}

/// Player bullets vs invaders. Each bullet resolves against the first
/// overlapping invader in array order only; a bullet survives exactly one
/// kill when pierce is active and it has not pierced yet.
fn resolve_player_bullets(state: &mut GameState) {
    let mut b = 0;
    'bullets: while b < state.bullets.len() {
        let bounds = state.bullets[b].bounds();
        for i in 0..state.invaders.len() {
            if !bounds.intersects(&state.invaders[i].bounds()) {
                continue;
            }
            state.invaders[i].hp -= state.player_damage;
            if state.invaders[i].is_boss() {
                state.shake = (state.shake + 1.0).min(5.0);
            }
            if state.invaders[i].hp <= 0 {
                let inv = state.invaders.remove(i);
                on_bullet_kill(state, &inv);
                if state.has_pierce && !state.bullets[b].pierced {
                    state.bullets[b].pierced = true;
                    b += 1;
                    continue 'bullets;
                }
            }
            state.bullets.remove(b);
            continue 'bullets;
        }
        b += 1;
    }
}

/// Enemy bullets and boss missiles vs player. Debug mode still consumes the
/// projectile but suppresses all player-damage consequences.
fn resolve_incoming_fire(state: &mut GameState, now: f64) {
    let player = state.player.bounds();

    let mut i = 0;
    while i < state.enemy_bullets.len() {
        if state.enemy_bullets[i].bounds().intersects(&player) {
            state.enemy_bullets.remove(i);
            if !state.debug {
                hit_player(state, now);
            }
        } else {
            i += 1;
        }
    }

    let mut i = 0;
    while i < state.boss_missiles.len() {
        if state.boss_missiles[i].bounds().intersects(&player) {
            state.boss_missiles.remove(i);
            if !state.debug {
                hit_player(state, now);
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bullet, EnemyBullet, InvaderTier};

    fn test_state() -> GameState {
        GameState::new(42)
    }

    fn grunt_at(pos: Vec2, hp: i32) -> Invader {
        Invader {
            pos,
            size: Vec2::new(INVADER_W, INVADER_H),
            tier: InvaderTier::Grunt,
            hp,
            max_hp: hp,
        }
    }

    #[test]
    fn aabb_overlap_is_strict() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let touching = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let apart = Aabb::new(Vec2::new(30.0, 0.0), Vec2::new(10.0, 10.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn bullet_damages_first_invader_in_order_only() {
        let mut state = test_state();
        // Two stacked invaders both overlapping the bullet
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 2));
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 2));
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
            pierced: false,
        });

        resolve_combat(&mut state, 0.0);

        assert_eq!(state.invaders[0].hp, 1);
        assert_eq!(state.invaders[1].hp, 2);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn kill_awards_score_and_removes_same_tick() {
        let mut state = test_state();
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
            pierced: false,
        });
        state.stats_dirty = false;

        resolve_combat(&mut state, 0.0);

        assert!(state.invaders.is_empty());
        assert_eq!(state.score, 10);
        assert!(state.stats_dirty);
    }

    #[test]
    fn pierce_survives_exactly_one_kill() {
        let mut state = test_state();
        state.has_pierce = true;
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
            pierced: false,
        });

        resolve_combat(&mut state, 0.0);
        // First kill: bullet flagged and kept
        assert!(state.invaders.is_empty());
        assert_eq!(state.bullets.len(), 1);
        assert!(state.bullets[0].pierced);

        // Second kill consumes it
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        resolve_combat(&mut state, 0.0);
        assert!(state.invaders.is_empty());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn pierced_bullet_consumed_on_non_kill_hit() {
        let mut state = test_state();
        state.has_pierce = true;
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 5));
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
            pierced: false,
        });

        resolve_combat(&mut state, 0.0);
        assert_eq!(state.invaders[0].hp, 4);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn shield_absorbs_hit_and_records_tick() {
        let mut state = test_state();
        state.has_shield_system = true;
        state.shield_hits = 1;
        state.enemy_bullets.push(EnemyBullet {
            pos: state.player.pos,
        });

        resolve_combat(&mut state, 1234.0);

        assert_eq!(state.lives, 3);
        assert_eq!(state.shield_hits, 0);
        assert_eq!(state.shield_lost_at, Some(1234.0));
        assert!(state.enemy_bullets.is_empty());
    }

    #[test]
    fn unshielded_hit_costs_a_life() {
        let mut state = test_state();
        state.enemy_bullets.push(EnemyBullet {
            pos: state.player.pos,
        });

        resolve_combat(&mut state, 0.0);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn debug_mode_consumes_projectile_without_damage() {
        let mut state = test_state();
        state.debug = true;
        state.enemy_bullets.push(EnemyBullet {
            pos: state.player.pos,
        });

        resolve_combat(&mut state, 0.0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.shake, 0.0);
        assert!(state.enemy_bullets.is_empty());
    }

    #[test]
    fn debug_mode_still_kills_invaders() {
        let mut state = test_state();
        state.debug = true;
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        state.bullets.push(Bullet {
            pos: Vec2::new(110.0, 105.0),
            pierced: false,
        });

        resolve_combat(&mut state, 0.0);
        assert!(state.invaders.is_empty());
        assert_eq!(state.score, 10);
    }

    #[test]
    fn upgrade_eligibility_respects_caps() {
        let mut state = test_state();
        assert_eq!(eligible_upgrades(&state).len(), 5);

        state.has_shield_system = true;
        state.has_pierce = true;
        state.rocket_level = ROCKET_LEVEL_CAP;
        state.lives = LIVES_CAP;
        let left = eligible_upgrades(&state);
        assert_eq!(left, vec![UpgradeKind::Double]);

        // Double stays eligible until BOTH shot and damage caps are hit
        state.shot_count = SHOT_COUNT_CAP;
        assert_eq!(eligible_upgrades(&state), vec![UpgradeKind::Double]);
        state.player_damage = DAMAGE_CAP;
        assert!(eligible_upgrades(&state).is_empty());
    }
}
