//! Turtle interpretation of an expanded symbol sequence.
//!
//! Commands:
//! - `F`: draw forward one segment (with heading jitter)
//! - `X`: drop a leaf site at the current position
//! - `+` / `-`: turn left / right by the base angle, scaled 0.8–1.2×
//! - `[`: push state, then shrink length and thickness and go one level deeper
//! - `]`: pop state (no-op on an empty stack)
//!
//! Output order is emission order; the animator reveals in that order.

use crate::palette::ColorKey;
use crate::params::GenerationParameters;
use glam::Vec2;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

/// A drawn segment of wood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
    pub level: u32,
    pub color: ColorKey,
    pub revealed: bool,
}

impl Branch {
    /// Point at `t` along the segment, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, t: f32) -> Vec2 {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeafKind {
    Leaf,
    Flower,
}

/// A place where foliage appears.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafSite {
    pub position: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub color: ColorKey,
    pub kind: LeafKind,
    pub revealed: bool,
    /// 0 until the animator reveals the leaf.
    pub opacity: f32,
}

/// Cursor state; copies of it live on the branch stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub position: Vec2,
    /// Radians, counter-clockwise from +x.
    pub heading: f32,
    pub segment_length: f32,
    pub thickness: f32,
    pub branch_level: u32,
}

impl TurtleState {
    /// At the origin, pointing straight up.
    pub fn root(params: &GenerationParameters) -> Self {
        Self {
            position: Vec2::ZERO,
            heading: FRAC_PI_2,
            segment_length: params.base_segment_length,
            thickness: params.base_thickness,
            branch_level: 0,
        }
    }

    fn forward(&self, heading: f32) -> Vec2 {
        self.position + Vec2::from_angle(heading) * self.segment_length
    }
}

/// Interpreter settings that are not derived from the score.
#[derive(Debug, Clone)]
pub struct Turtle {
    /// Multiplier band applied to every turn.
    pub turn_band: RangeInclusive<f32>,
    /// Max offset of an `X` leaf from the turtle, per axis.
    pub leaf_scatter: f32,
    /// Chance that an `X` site is a flower.
    pub flower_chance: f64,
}

impl Default for Turtle {
    fn default() -> Self {
        Self {
            turn_band: 0.8..=1.2,
            leaf_scatter: 5.0,
            flower_chance: 0.3,
        }
    }
}

impl Turtle {
    /// Exact turns and leaves placed exactly on the turtle.
    pub fn without_jitter(mut self) -> Self {
        self.turn_band = 1.0..=1.0;
        self.leaf_scatter = 0.0;
        self
    }

    /// Walks `sequence` and returns branches and leaf sites in emission order.
    pub fn interpret<R: Rng>(
        &self,
        sequence: &str,
        params: &GenerationParameters,
        rng: &mut R,
    ) -> (Vec<Branch>, Vec<LeafSite>) {
        let mut branches = Vec::new();
        let mut leaves = Vec::new();
        let mut stack: Vec<TurtleState> = Vec::new();
        let mut state = TurtleState::root(params);

        let turn = params.base_angle_degrees.to_radians();
        let jitter = params.angle_jitter_degrees.abs().to_radians();

        for symbol in sequence.chars() {
            match symbol {
                'F' => {
                    let heading = state.heading + symmetric(rng, jitter);
                    let end = state.forward(heading);
                    branches.push(Branch {
                        start: state.position,
                        end,
                        thickness: state.thickness,
                        level: state.branch_level,
                        color: ColorKey::Bark { level: state.branch_level },
                        revealed: false,
                    });
                    state.position = end;
                }
                'X' => {
                    let offset = Vec2::new(
                        symmetric(rng, self.leaf_scatter),
                        symmetric(rng, self.leaf_scatter),
                    );
                    let kind = if rng.gen_bool(crate::probability(self.flower_chance)) {
                        LeafKind::Flower
                    } else {
                        LeafKind::Leaf
                    };
                    let color = match kind {
                        LeafKind::Flower => ColorKey::Blossom,
                        LeafKind::Leaf => ColorKey::random_leaf(params.palette_index, rng),
                    };
                    leaves.push(LeafSite {
                        position: state.position + offset,
                        size: rng.gen_range(2.0..5.0),
                        rotation: rng.gen_range(0.0..TAU),
                        color,
                        kind,
                        revealed: false,
                        opacity: 0.0,
                    });
                }
                '+' => state.heading += turn * self.turn_factor(rng),
                '-' => state.heading -= turn * self.turn_factor(rng),
                '[' => {
                    stack.push(state);
                    state.segment_length *= params.length_decay;
                    state.thickness *= params.thickness_decay;
                    state.branch_level += 1;
                }
                ']' => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            tracing::debug!(open = stack.len(), "discarding unclosed branch stack");
        }

        (branches, leaves)
    }

    fn turn_factor<R: Rng>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = (*self.turn_band.start(), *self.turn_band.end());
        if hi > lo {
            rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }
}

/// Uniform in `[-half, half]`; exactly 0 (and no rng draw) when `half` is 0.
fn symmetric<R: Rng>(rng: &mut R, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}

/// Adds leaves along non-trunk branches, then caps the list at the target.
///
/// Existing leaves keep their positions at the front of the list.
pub fn scatter_leaves<R: Rng>(
    branches: &[Branch],
    leaves: &mut Vec<LeafSite>,
    params: &GenerationParameters,
    rng: &mut R,
) {
    let target = params.leaf_density_target as usize;

    for branch in branches.iter().filter(|b| b.level > 0) {
        if leaves.len() >= target {
            break;
        }
        if !rng.gen_bool(0.7) {
            continue;
        }

        let count = rng.gen_range(1..=2);
        for _ in 0..count {
            let anchor = branch.lerp(rng.gen_range(0.0..=1.0));
            let offset = Vec2::new(rng.gen_range(-6.0..=6.0), rng.gen_range(-6.0..=6.0));
            leaves.push(LeafSite {
                position: anchor + offset,
                size: rng.gen_range(1.5..4.0),
                rotation: rng.gen_range(0.0..TAU),
                color: ColorKey::random_leaf(params.palette_index, rng),
                kind: LeafKind::Leaf,
                revealed: false,
                opacity: 0.0,
            });
        }
    }

    leaves.truncate(target);
}
