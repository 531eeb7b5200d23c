//! Drifting decorative particles shed by a grown tree.

use crate::palette::ColorKey;
use crate::scene::Bounds;
use glam::Vec2;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::TAU;

// Particle generation constants
const DRIFT_X: f32 = 15.0;
const MIN_RISE: f32 = 30.0;
const MAX_RISE: f32 = 150.0;
const MIN_SIZE: f32 = 1.0;
const MAX_SIZE: f32 = 3.0;
const MAX_SPIN: f32 = 3.0;
/// Life lost per second; a particle lasts a little over three seconds.
pub const LIFE_DECAY: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vec2,
    /// Units per second.
    pub velocity: Vec2,
    pub size: f32,
    pub color: ColorKey,
    /// 1 at birth, removed once it reaches 0.
    pub life: f32,
    pub rotation: f32,
    /// Radians per second.
    pub rotation_speed: f32,
}

/// Owns the live particles for one tree.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    area: Bounds,
    palette_index: usize,
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new(area: Bounds, palette_index: usize) -> Self {
        Self {
            area,
            palette_index,
            particles: Vec::new(),
        }
    }

    /// Creates one particle on the bottom edge of the area and keeps it.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> &Particle {
        let x = if self.area.width() > 0.0 {
            rng.gen_range(self.area.min.x..=self.area.max.x)
        } else {
            self.area.min.x
        };

        let particle = Particle {
            position: Vec2::new(x, self.area.min.y),
            velocity: Vec2::new(rng.gen_range(-DRIFT_X..=DRIFT_X), rng.gen_range(MIN_RISE..MAX_RISE)),
            size: rng.gen_range(MIN_SIZE..MAX_SIZE),
            color: ColorKey::random_leaf(self.palette_index, rng),
            life: 1.0,
            rotation: rng.gen_range(0.0..TAU),
            rotation_speed: rng.gen_range(-MAX_SPIN..=MAX_SPIN),
        };

        self.particles.push(particle);
        &self.particles[self.particles.len() - 1]
    }

    /// Moves, spins and ages every particle by `dt` seconds, dropping the dead.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.particles.retain_mut(|p| {
            p.position += p.velocity * dt;
            p.rotation = (p.rotation + p.rotation_speed * dt).rem_euclid(TAU);
            p.life -= LIFE_DECAY * dt;
            p.life > 0.0
        });
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
