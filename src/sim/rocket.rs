//! Homing rocket subsystem
//!
//! Rockets commit to the lowest formation row, not a specific unit: the
//! target point is re-resolved every tick against the nearest surviving
//! member of that row, so a target's death never dangles a reference.
//! Flight is a straight launch followed by under-damped proportional
//! steering with constant thrust.

use glam::Vec2;
use rand::Rng;

use super::collision::{boss_drop_rolls, spawn_upgrade};
use super::particles::color;
use super::state::{GameState, Rocket};
use crate::consts::*;

/// Spawn, guide, detonate and prune rockets for this tick
pub fn update_rockets(state: &mut GameState, now: f64) {
    spawn_rocket(state, now);

    let mut r = 0;
    while r < state.rockets.len() {
        retarget(state, r);

        let center = state.rockets[r].center();
        let to_target = state.rockets[r].target - center;
        let dist_sq = to_target.length_squared();

        if dist_sq < ROCKET_HIT_RADIUS * ROCKET_HIT_RADIUS {
            detonate(state, center);
            state.rockets.remove(r);
            continue;
        }

        let rocket = &mut state.rockets[r];
        let dist = dist_sq.sqrt();
        if dist > 0.0 && rocket.traveled >= ROCKET_VERTICAL_PHASE {
            let desired = to_target / dist * ROCKET_MAX_SPEED;
            rocket.vel += (desired - rocket.vel) * ROCKET_STEER_STRENGTH;
        }

        let speed = rocket.vel.length();
        if speed > 0.0 {
            rocket.vel += rocket.vel / speed * ROCKET_THRUST;
            let new_speed = rocket.vel.length();
            if new_speed > ROCKET_MAX_SPEED {
                rocket.vel = rocket.vel / new_speed * ROCKET_MAX_SPEED;
            }
        }
        rocket.pos += rocket.vel;
        rocket.traveled += rocket.vel.length();

        let (center, vel) = (state.rockets[r].center(), state.rockets[r].vel);
        state.particles.spawn_rocket_trail(center, vel, &mut state.rng);

        let pos = state.rockets[r].pos;
        let off_field = pos.y < -ROCKET_H * 2.0
            || pos.y > FIELD_H + ROCKET_H
            || pos.x < -ROCKET_W * 2.0
            || pos.x > FIELD_W + ROCKET_W;
        if off_field {
            // Missed shot; no penalty beyond the lost rocket
            state.rockets.remove(r);
        } else {
            r += 1;
        }
    }
}

/// Fire one rocket at a random lowest-row unit when the interval has elapsed
fn spawn_rocket(state: &mut GameState, now: f64) {
    if state.rocket_level == 0 || now - state.last_rocket < ROCKET_INTERVAL_MS {
        return;
    }
    let lowest = state.lowest_row_invaders();
    if lowest.is_empty() {
        return;
    }
    state.last_rocket = now;
    let target = state.invaders[lowest[state.rng.random_range(0..lowest.len())]].center();
    state.rockets.push(Rocket {
        pos: Vec2::new(
            state.player.pos.x + PLAYER_W / 2.0 - ROCKET_W / 2.0,
            state.player.pos.y,
        ),
        vel: Vec2::new(0.0, -ROCKET_INITIAL_SPEED),
        target,
        traveled: 0.0,
    });
}

/// Re-acquire the nearest surviving lowest-row unit as the live target point
fn retarget(state: &mut GameState, r: usize) {
    let lowest = state.lowest_row_invaders();
    if lowest.is_empty() {
        return;
    }
    let current = state.rockets[r].target;
    let best = lowest
        .into_iter()
        .map(|i| state.invaders[i].center())
        .min_by(|a, b| {
            (*a - current)
                .length_squared()
                .total_cmp(&(*b - current).length_squared())
        });
    if let Some(point) = best {
        state.rockets[r].target = point;
    }
}

/// Blast every invader within `rocket_level * unit_width + half its own size`
/// of the detonation point. Non-boss units take double player damage; bosses
/// take single damage. Kills award 1.5x score, floored.
fn detonate(state: &mut GameState, center: Vec2) {
    use std::f32::consts::TAU;

    let blast_radius = state.rocket_level as f32 * INVADER_W;
    state.shake = 10.0;
    state
        .particles
        .spawn_explosion(center, color::ROCKET, 0.0, TAU, blast_radius * 0.8, &mut state.rng);
    state
        .particles
        .spawn_explosion(center, color::FLASH, 0.0, TAU, blast_radius * 0.4, &mut state.rng);

    let mut i = state.invaders.len();
    while i > 0 {
        i -= 1;
        let inv_center = state.invaders[i].center();
        let reach = blast_radius + state.invaders[i].size.max_element() / 2.0;
        if (inv_center - center).length_squared() > reach * reach {
            continue;
        }

        let damage = if state.invaders[i].is_boss() {
            state.player_damage
        } else {
            state.player_damage * 2
        };
        state.invaders[i].hp -= damage;
        if state.invaders[i].hp <= 0 {
            let inv = state.invaders.remove(i);
            state.score += (inv.tier.score_value() as f32 * 1.5).floor() as u32;
            state
                .particles
                .spawn_explosion(inv.center(), inv.tier.color(), 0.0, TAU, 0.0, &mut state.rng);
            if inv.is_boss() {
                state.shake = 40.0;
                let quarter = inv.pos + inv.size / 4.0;
                let three_quarter = inv.pos + inv.size * 0.75;
                state
                    .particles
                    .spawn_explosion(quarter, inv.tier.color(), 0.0, TAU, 20.0, &mut state.rng);
                state
                    .particles
                    .spawn_explosion(three_quarter, inv.tier.color(), 0.0, TAU, 20.0, &mut state.rng);
                boss_drop_rolls(state, &inv);
            } else {
                spawn_upgrade(state, inv.pos);
            }
        }
    }
    state.mark_stats_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Invader, InvaderTier};

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
    fn no_spawn_without_rocket_level() {
        let mut state = GameState::new(1);
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        update_rockets(&mut state, 10_000.0);
        assert!(state.rockets.is_empty());
    }

    #[test]
    fn no_spawn_without_targets() {
        let mut state = GameState::new(1);
        state.rocket_level = 1;
        update_rockets(&mut state, 10_000.0);
        assert!(state.rockets.is_empty());
    }

    #[test]
    fn spawns_after_interval_targeting_lowest_row() {
        let mut state = GameState::new(1);
        state.rocket_level = 1;
        state.invaders.push(grunt_at(Vec2::new(100.0, 100.0), 1));
        state.invaders.push(grunt_at(Vec2::new(100.0, 300.0), 1));

        update_rockets(&mut state, ROCKET_INTERVAL_MS + 1.0);
        assert_eq!(state.rockets.len(), 1);
        // Only the lower invader is in the target pool
        let expected = state.invaders[1].center();
        assert_eq!(state.rockets[0].target, expected);
        assert_eq!(state.last_rocket, ROCKET_INTERVAL_MS + 1.0);
    }

    #[test]
    fn launch_phase_flies_straight_up() {
        let mut state = GameState::new(1);
        state.invaders.push(grunt_at(Vec2::new(700.0, 100.0), 5));
        state.rockets.push(Rocket {
            pos: Vec2::new(100.0, 500.0),
            vel: Vec2::new(0.0, -ROCKET_INITIAL_SPEED),
            target: Vec2::new(718.0, 112.0),
            traveled: 0.0,
        });

        update_rockets(&mut state, 0.0);
        // No steering before the vertical phase threshold
        assert_eq!(state.rockets[0].vel.x, 0.0);
        assert!(state.rockets[0].vel.y < 0.0);
        assert!(state.rockets[0].traveled > 0.0);
    }

    #[test]
    fn homing_engages_after_vertical_phase() {
        let mut state = GameState::new(1);
        state.invaders.push(grunt_at(Vec2::new(700.0, 100.0), 5));
        state.rockets.push(Rocket {
            pos: Vec2::new(100.0, 300.0),
            vel: Vec2::new(0.0, -4.0),
            target: Vec2::new(718.0, 112.0),
            traveled: ROCKET_VERTICAL_PHASE,
        });

        update_rockets(&mut state, 0.0);
        // Steering pulls velocity toward the (rightward) target
        assert!(state.rockets[0].vel.x > 0.0);
    }

    #[test]
    fn retargets_nearest_surviving_row_member() {
        let mut state = GameState::new(1);
        state.invaders.push(grunt_at(Vec2::new(100.0, 200.0), 5));
        state.invaders.push(grunt_at(Vec2::new(400.0, 200.0), 5));
        state.rockets.push(Rocket {
            pos: Vec2::new(100.0, 500.0),
            vel: Vec2::new(0.0, -2.0),
            // Stale point near a unit that no longer exists
            target: Vec2::new(390.0, 212.0),
            traveled: 0.0,
        });

        update_rockets(&mut state, 0.0);
        assert_eq!(state.rockets[0].target, state.invaders[1].center());
    }

    #[test]
    fn blast_radius_boundary_is_inclusive() {
        let mut state = GameState::new(1);
        state.rocket_level = 2;
        state.player_damage = 1;

        let center = Vec2::new(400.0, 300.0);
        // reach = 2*36 + 18 = 90 for a standard unit (max dimension 36)
        let reach = 2.0 * INVADER_W + INVADER_W / 2.0;
        let mut on_boundary = grunt_at(Vec2::ZERO, 3);
        on_boundary.pos = center + Vec2::new(reach, 0.0) - on_boundary.size / 2.0;
        let mut outside = grunt_at(Vec2::ZERO, 3);
        outside.pos = center + Vec2::new(reach + 0.5, 0.0) - outside.size / 2.0;
        state.invaders.push(on_boundary);
        state.invaders.push(outside);

        detonate(&mut state, center);

        // Inclusive <= boundary: first damaged (double), second untouched
        assert_eq!(state.invaders[0].hp, 1);
        assert_eq!(state.invaders[1].hp, 3);
    }

    #[test]
    fn blast_kill_awards_score_times_one_and_a_half_floored() {
        let mut state = GameState::new(1);
        state.rocket_level = 1;
        state.invaders.push(grunt_at(Vec2::new(400.0, 300.0), 1));

        let center = state.invaders[0].center();
        detonate(&mut state, center);
        assert!(state.invaders.is_empty());
        assert_eq!(state.score, 15);
    }

    #[test]
    fn boss_takes_single_damage_from_blast() {
        let mut state = GameState::new(1);
        state.rocket_level = 5;
        state.player_damage = 3;
        let boss = Invader {
            pos: Vec2::new(300.0, 100.0),
            size: Vec2::new(INVADER_W * 6.0, INVADER_H * 6.0),
            tier: InvaderTier::Boss,
            hp: 100,
            max_hp: 100,
        };
        let boss_center = boss.center();
        state.invaders.push(boss);

        detonate(&mut state, boss_center);
        assert_eq!(state.invaders[0].hp, 97);
    }

    #[test]
    fn off_field_rocket_is_discarded() {
        let mut state = GameState::new(1);
        state.invaders.push(grunt_at(Vec2::new(700.0, 500.0), 5));
        state.rockets.push(Rocket {
            pos: Vec2::new(100.0, -ROCKET_H * 2.0 + 1.0),
            vel: Vec2::new(0.0, -ROCKET_MAX_SPEED),
            target: Vec2::new(718.0, 512.0),
            traveled: 0.0,
        });

        update_rockets(&mut state, 0.0);
        assert!(state.rockets.is_empty());
        // Nothing was damaged
        assert_eq!(state.invaders[0].hp, 5);
    }
}
