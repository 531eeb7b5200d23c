//! Maps an activity score onto generation parameters.
//!
//! Everything here is a clamped step function of the score: no I/O, no
//! randomness. The constants are presentation tuning, not invariants.

use crate::grammar;
use crate::palette::Season;
use serde::Serialize;
use std::fmt;

const MAX_ITERATIONS: u32 = 6;
const MIN_SEGMENT: f32 = 15.0;
const MAX_SEGMENT: f32 = 35.0;
const MIN_THICKNESS: f32 = 3.0;
const MAX_THICKNESS: f32 = 15.0;
const MAX_LEAVES: u32 = 80;
const LENGTH_DECAY: f32 = 0.75;
const THICKNESS_DECAY: f32 = 0.7;
const BASE_ANGLE: f32 = 22.5;
const ANGLE_JITTER: f32 = 8.0;
const PARTICLE_RATE: f64 = 0.03;
const PARTICLE_MIN_SCORE: f64 = 100.0;

/// Inputs to one growth event. Derived once from the score and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub iteration_count: u32,
    pub base_segment_length: f32,
    pub length_decay: f32,
    pub thickness_decay: f32,
    pub base_angle_degrees: f32,
    pub angle_jitter_degrees: f32,
    pub base_thickness: f32,
    pub leaf_density_target: u32,
    pub palette_index: usize,
    pub rule_set_index: usize,
    /// Chance per frame that a settled tree sheds a particle.
    pub particle_rate: f64,
}

impl GenerationParameters {
    /// The bare seed: no rewriting, nothing to draw.
    pub fn seed() -> Self {
        map(0.0)
    }

    pub fn season(&self) -> Season {
        Season::from_index(self.palette_index)
    }

    /// Same parameters with all angular noise removed.
    pub fn without_jitter(mut self) -> Self {
        self.angle_jitter_degrees = 0.0;
        self
    }
}

/// Growth stage label shown next to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TreeStage {
    Seed,
    Sprout,
    Sapling,
    Mature,
    Ancient,
}

impl TreeStage {
    pub fn from_score(score: f64) -> Self {
        let s = sanitize(score);
        if s == 0.0 {
            TreeStage::Seed
        } else if s <= 50.0 {
            TreeStage::Sprout
        } else if s <= 200.0 {
            TreeStage::Sapling
        } else if s <= 500.0 {
            TreeStage::Mature
        } else {
            TreeStage::Ancient
        }
    }
}

impl fmt::Display for TreeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TreeStage::Seed => "Seed",
            TreeStage::Sprout => "Sprout",
            TreeStage::Sapling => "Sapling",
            TreeStage::Mature => "Mature Tree",
            TreeStage::Ancient => "Ancient Tree",
        };
        f.write_str(label)
    }
}

/// NaN, negative and infinite scores all collapse to 0.
pub fn sanitize(score: f64) -> f64 {
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

fn iterations_for(s: f64) -> u32 {
    if s == 0.0 {
        0
    } else if s <= 25.0 {
        2
    } else if s <= 75.0 {
        3
    } else if s <= 200.0 {
        4
    } else if s <= 500.0 {
        5
    } else {
        let extra = (s / 1000.0).floor().min(MAX_ITERATIONS as f64) as u32;
        (5 + extra).min(MAX_ITERATIONS)
    }
}

/// Total mapping from score to parameters.
pub fn map(score: f64) -> GenerationParameters {
    let s = sanitize(score);

    let params = GenerationParameters {
        iteration_count: iterations_for(s),
        base_segment_length: (20.0 + s.sqrt() * 0.5).clamp(MIN_SEGMENT as f64, MAX_SEGMENT as f64)
            as f32,
        length_decay: LENGTH_DECAY,
        thickness_decay: THICKNESS_DECAY,
        base_angle_degrees: BASE_ANGLE + ((s % 100.0) * 0.1) as f32,
        angle_jitter_degrees: ANGLE_JITTER,
        base_thickness: (s / 30.0 + 3.0).clamp(MIN_THICKNESS as f64, MAX_THICKNESS as f64) as f32,
        leaf_density_target: (s / 10.0).min(MAX_LEAVES as f64).floor() as u32,
        palette_index: ((s / 100.0).floor() % Season::ALL.len() as f64) as usize,
        rule_set_index: grammar::select(s, grammar::presets::COUNT),
        particle_rate: if s > PARTICLE_MIN_SCORE { PARTICLE_RATE } else { 0.0 },
    };

    tracing::debug!(
        score = s,
        iterations = params.iteration_count,
        leaves = params.leaf_density_target,
        rules = params.rule_set_index,
        "mapped score to parameters"
    );

    params
}
