//! Procedural trees grown from a single activity score.
//!
//! The pipeline is: [`params::map`] turns the score into
//! [`GenerationParameters`], [`grammar::expand`] rewrites the axiom,
//! [`turtle::Turtle`] walks the result into branches and leaf sites, and
//! [`animator::GrowthAnimator`] reveals them frame by frame.
//!
//! ```
//! let tree = arbor::generate(600.0, Some(7));
//! assert!(!tree.branches.is_empty());
//! assert!(tree.leaves.len() <= tree.params.leaf_density_target as usize);
//! ```

pub mod animator;
pub mod config;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod palette;
pub mod params;
pub mod particles;
pub mod profile;
pub mod scene;
pub mod settings;
pub mod turtle;

pub use animator::GrowthAnimator;
pub use error::Error;
pub use params::{GenerationParameters, TreeStage};
pub use scene::{Bounds, Phase, Primitive, Scene};
pub use turtle::{Branch, LeafKind, LeafSite};

use glam::Vec2;
use grammar::RuleSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use turtle::Turtle;

/// Output of one generation: parameters plus geometry in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    pub params: GenerationParameters,
    pub branches: Vec<Branch>,
    pub leaves: Vec<LeafSite>,
}

impl Tree {
    /// Frame used when there is nothing (yet) to draw.
    pub fn seedling_bounds() -> Bounds {
        Bounds::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 20.0))
    }

    /// Extent of every branch end and leaf, always including the root.
    pub fn bounds(&self) -> Bounds {
        let points = self
            .branches
            .iter()
            .flat_map(|b| [b.start, b.end])
            .chain(self.leaves.iter().map(|l| l.position))
            .chain(std::iter::once(Vec2::ZERO));
        match Bounds::enclosing(points) {
            Some(b) if b.width() > 0.0 && b.height() > 0.0 => b,
            _ => Self::seedling_bounds(),
        }
    }

    pub fn max_level(&self) -> u32 {
        self.branches.iter().map(|b| b.level).max().unwrap_or(0)
    }

    pub fn is_seed(&self) -> bool {
        self.branches.is_empty() && self.leaves.is_empty()
    }

    /// Marks everything visible at full opacity, for static output.
    pub fn reveal_all(&mut self) {
        for b in &mut self.branches {
            b.revealed = true;
        }
        for l in &mut self.leaves {
            l.revealed = true;
            l.opacity = 1.0;
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            phase: Phase::Settled,
            branches: &self.branches,
            leaves: &self.leaves,
            particles: &[],
            bounds: self.bounds(),
        }
    }
}

/// Grows the tree for `score`. With a seed the result is reproducible.
pub fn generate(score: f64, seed: Option<u64>) -> Tree {
    let params = params::map(score);
    let rules = grammar::presets::all()
        .into_iter()
        .nth(params.rule_set_index)
        .unwrap_or_else(grammar::presets::bushy);
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(entropy_seed));
    generate_with(params, &rules, &Turtle::default(), &mut rng)
}

/// Full control over every stage of generation.
pub fn generate_with<R: Rng>(
    params: GenerationParameters,
    rules: &RuleSet,
    turtle: &Turtle,
    rng: &mut R,
) -> Tree {
    let sequence = grammar::expand(grammar::AXIOM, rules, params.iteration_count);
    let (branches, mut leaves) = turtle.interpret(&sequence, &params, rng);
    turtle::scatter_leaves(&branches, &mut leaves, &params, rng);

    tracing::debug!(
        symbols = sequence.len(),
        branches = branches.len(),
        leaves = leaves.len(),
        "tree generated"
    );

    Tree {
        params,
        branches,
        leaves,
    }
}

/// A usable `gen_bool` argument: NaN and infinities count as never.
pub(crate) fn probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Seed from the wall clock, for runs that did not ask for one.
pub fn entropy_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
