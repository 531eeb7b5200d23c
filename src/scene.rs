//! Read-only frame snapshots handed to renderers.

use crate::particles::Particle;
use crate::turtle::{Branch, LeafKind, LeafSite};
use glam::Vec2;
use serde::Serialize;

/// Axis-aligned box in world units (y up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box holding every point, or `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Where the animator is in a growth event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Revealing,
    Settled,
}

/// One drawable thing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    Segment(&'a Branch),
    Leaf(&'a LeafSite),
    Flower(&'a LeafSite),
    Mote(&'a Particle),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub phase: Phase,
    pub branches: &'a [Branch],
    pub leaves: &'a [LeafSite],
    pub particles: &'a [Particle],
    /// Extent of the whole tree, revealed or not; stable for the event.
    pub bounds: Bounds,
}

impl<'a> Scene<'a> {
    /// Revealed geometry in draw order: wood, then foliage, then particles.
    pub fn primitives(&self) -> impl Iterator<Item = Primitive<'a>> + 'a {
        let branches = self.branches.iter().filter(|b| b.revealed).map(Primitive::Segment);
        let leaves = self.leaves.iter().filter(|l| l.revealed).map(|l| match l.kind {
            LeafKind::Leaf => Primitive::Leaf(l),
            LeafKind::Flower => Primitive::Flower(l),
        });
        let particles = self.particles.iter().map(Primitive::Mote);
        branches.chain(leaves).chain(particles)
    }

    pub fn revealed_branches(&self) -> usize {
        self.branches.iter().filter(|b| b.revealed).count()
    }
}
