//! Fixed-capacity particle pool for explosions and rocket trails
//!
//! Slots are allocated from a free-index stack and tracked in an active-index
//! list so `update` is O(active), not O(capacity). Removal swaps the last
//! active index into the removed position. Spawn requests past capacity are
//! dropped silently.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Pool capacity; never grows
pub const POOL_CAPACITY: usize = 1024;

/// Particle/sprite palette ids, resolved to CSS colors by the renderer
pub mod color {
    pub const PLAYER: u32 = 0;
    /// Magenta mid-tier invader
    pub const INVADER_MID: u32 = 1;
    /// Green base-tier invader
    pub const INVADER_LOW: u32 = 2;
    /// Orange top-tier invader
    pub const INVADER_TOP: u32 = 3;
    pub const BOSS: u32 = 4;
    pub const ROCKET: u32 = 5;
    pub const FLASH: u32 = 6;
    pub const SHIELD: u32 = 7;
    pub const PIERCE: u32 = 8;
    pub const HEAL: u32 = 9;
}

/// A transient visual effect particle
#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub max_size: f32,
    /// Frame counter; the particle is reclaimed once `life >= max_life`
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
}

/// Object pool backing all particle effects
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: Vec<usize>,
    active: Vec<usize>,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self {
            slots: vec![Particle::default(); POOL_CAPACITY],
            // Reversed so the first allocations come from slot 0 upward
            free: (0..POOL_CAPACITY).rev().collect(),
            active: Vec::with_capacity(POOL_CAPACITY),
        }
    }
}

impl ParticlePool {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// True once every particle has been reclaimed (gates level transitions)
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.active.iter().map(|&idx| &self.slots[idx])
    }

    fn alloc(&mut self) -> Option<usize> {
        let idx = self.free.pop()?;
        self.active.push(idx);
        Some(idx)
    }

    /// Burst of particles spread evenly across `[angle_start, angle_start + angle_range)`
    /// with per-particle jitter. `radius > 0` marks a large blast: triple the
    /// particle count, speed derived from the radius, double size, 1.5x life.
    pub fn spawn_explosion<R: Rng>(
        &mut self,
        center: Vec2,
        color: u32,
        angle_start: f32,
        angle_range: f32,
        radius: f32,
        rng: &mut R,
    ) {
        let count = if radius > 0.0 {
            EXPLOSION_PARTICLES * 3
        } else {
            EXPLOSION_PARTICLES
        };
        for n in 0..count {
            let Some(idx) = self.alloc() else {
                break;
            };

            let jitter = (rng.random::<f32>() - 0.5) * (angle_range / count as f32);
            let angle = angle_start + angle_range * n as f32 / count as f32 + jitter;
            let speed_base = if radius > 0.0 { radius * 0.15 } else { PARTICLE_SPEED };
            let speed = speed_base * (0.6 + rng.random::<f32>() * 0.8);
            let size_base = if radius > 0.0 {
                PARTICLE_MAX_SIZE * 2.0
            } else {
                PARTICLE_MAX_SIZE
            };
            let max_size = size_base * (0.4 + rng.random::<f32>() * 0.6);
            let max_life = if radius > 0.0 {
                (PARTICLE_LIFE as f32 * 1.5) as u32
            } else {
                PARTICLE_LIFE
            };

            self.slots[idx] = Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: max_size,
                max_size,
                life: 0,
                max_life,
                color,
            };
        }
    }

    /// One drag-scaled particle trailing opposite the rocket's velocity
    pub fn spawn_rocket_trail<R: Rng>(&mut self, center: Vec2, vel: Vec2, rng: &mut R) {
        let Some(idx) = self.alloc() else {
            return;
        };

        let back = -vel * ROCKET_TRAIL_DRAG;
        let jitter = Vec2::new(
            (rng.random::<f32>() - 0.5) * 1.5,
            (rng.random::<f32>() - 0.5) * 1.5,
        );

        self.slots[idx] = Particle {
            pos: center,
            vel: back + jitter,
            size: ROCKET_TRAIL_SIZE,
            max_size: ROCKET_TRAIL_SIZE * (0.6 + rng.random::<f32>() * 0.4),
            life: 0,
            max_life: ROCKET_TRAIL_LIFE,
            color: color::ROCKET,
        };
    }

    /// Layered multi-blast used for boss deaths
    pub fn spawn_stunning_explosion<R: Rng>(&mut self, center: Vec2, color_id: u32, rng: &mut R) {
        use std::f32::consts::TAU;
        self.spawn_explosion(center, color_id, 0.0, TAU, 40.0, rng);
        self.spawn_explosion(center, color::FLASH, 0.0, TAU, 20.0, rng);
        self.spawn_explosion(center, color_id, 0.0, TAU, 0.0, rng);
    }

    /// Advance every active particle and reclaim the expired ones
    pub fn update(&mut self) {
        let mut i = 0;
        while i < self.active.len() {
            let idx = self.active[i];
            let p = &mut self.slots[idx];
            p.pos += p.vel;
            p.life += 1;
            if p.life >= p.max_life {
                self.free.push(idx);
                self.active.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}
