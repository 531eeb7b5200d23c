//! Frame-driven reveal of a generated tree.
//!
//! The host owns the frame loop and calls [`GrowthAnimator::tick`] once per
//! frame; the animator never sleeps or spawns. A growth event holds at most
//! one frame subscription, and starting or resetting drops the previous one
//! along with all of its geometry.

use crate::config::AnimationConfig;
use crate::particles::{Particle, ParticleSystem};
use crate::scene::{Bounds, Phase, Scene};
use crate::turtle::{Branch, LeafSite};
use crate::Tree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Receives one scene snapshot per tick.
pub type FrameCallback = Box<dyn FnMut(&Scene<'_>)>;

/// Per-event timing, fixed at `start`.
#[derive(Debug, Clone, Copy, Default)]
struct Schedule {
    branches_per_frame: usize,
    leaves_per_frame: usize,
    leaf_start: Duration,
    reveal: Duration,
    settle_after: Duration,
}

pub struct GrowthAnimator {
    config: AnimationConfig,
    rng: StdRng,
    phase: Phase,
    schedule: Schedule,
    branches: Vec<Branch>,
    leaves: Vec<LeafSite>,
    particles: ParticleSystem,
    particle_rate: f64,
    bounds: Bounds,
    branch_cursor: usize,
    leaf_cursor: usize,
    started: Option<Instant>,
    last_tick: Option<Instant>,
    on_frame: Option<FrameCallback>,
}

impl GrowthAnimator {
    pub fn new(config: AnimationConfig, seed: u64) -> Self {
        let bounds = Tree::seedling_bounds();
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Idle,
            schedule: Schedule::default(),
            branches: Vec::new(),
            leaves: Vec::new(),
            particles: ParticleSystem::new(bounds, 0),
            particle_rate: 0.0,
            bounds,
            branch_cursor: 0,
            leaf_cursor: 0,
            started: None,
            last_tick: None,
            on_frame: None,
        }
    }

    /// Begins revealing `tree`, replacing any event already in flight.
    pub fn start<F>(&mut self, tree: Tree, now: Instant, on_frame: F)
    where
        F: FnMut(&Scene<'_>) + 'static,
    {
        self.reset();

        let bounds = tree.bounds();
        let Tree { params, mut branches, mut leaves } = tree;
        for b in &mut branches {
            b.revealed = false;
        }
        for l in &mut leaves {
            l.revealed = false;
            l.opacity = 0.0;
        }

        self.schedule = Schedule {
            branches_per_frame: self.config.branches_per_frame(branches.len()),
            leaves_per_frame: self.config.leaves_per_frame(leaves.len()),
            leaf_start: self.config.leaf_start(branches.len()),
            reveal: self.config.reveal_duration(branches.len()),
            settle_after: self.config.settle_after(branches.len()),
        };
        self.particles = ParticleSystem::new(bounds, params.palette_index);
        self.particle_rate = crate::probability(params.particle_rate);
        self.bounds = bounds;
        self.branches = branches;
        self.leaves = leaves;
        self.started = Some(now);
        self.last_tick = Some(now);
        self.on_frame = Some(Box::new(on_frame));
        self.phase = Phase::Revealing;

        tracing::info!(
            branches = self.branches.len(),
            leaves = self.leaves.len(),
            reveal_ms = self.schedule.reveal.as_millis() as u64,
            "growth started"
        );
    }

    /// Back to Idle with nothing left over. Safe from any state, any number of times.
    pub fn reset(&mut self) {
        if self.phase != Phase::Idle {
            tracing::debug!(phase = ?self.phase, "growth reset");
        }
        self.on_frame = None;
        self.phase = Phase::Idle;
        self.schedule = Schedule::default();
        self.branches.clear();
        self.leaves.clear();
        self.particles.clear();
        self.particle_rate = 0.0;
        self.bounds = Tree::seedling_bounds();
        self.branch_cursor = 0;
        self.leaf_cursor = 0;
        self.started = None;
        self.last_tick = None;
    }

    /// Ends the frame subscription but keeps the revealed tree in place.
    pub fn stop(&mut self) {
        self.on_frame = None;
        self.particles.clear();
    }

    /// Advances one frame and hands the scene to the subscriber.
    pub fn tick(&mut self, now: Instant) -> Phase {
        let Some(started) = self.started else {
            return self.phase;
        };
        if self.on_frame.is_none() {
            return self.phase;
        }

        let elapsed = now.saturating_duration_since(started);
        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_tick = Some(now);

        if self.phase == Phase::Revealing {
            self.reveal_branches();
            if elapsed >= self.schedule.leaf_start {
                self.reveal_leaves();
            }
            if self.branch_cursor == self.branches.len()
                && self.leaf_cursor == self.leaves.len()
                && elapsed >= self.schedule.settle_after
            {
                self.phase = Phase::Settled;
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "growth settled");
            }
        }

        if self.particles_ready(elapsed) && self.rng.gen_bool(self.particle_rate) {
            self.particles.spawn(&mut self.rng);
        }
        self.particles.tick(dt.as_secs_f32());

        if let Some(mut on_frame) = self.on_frame.take() {
            on_frame(&self.scene());
            self.on_frame = Some(on_frame);
        }

        self.phase
    }

    fn reveal_branches(&mut self) {
        let end = (self.branch_cursor + self.schedule.branches_per_frame).min(self.branches.len());
        for branch in &mut self.branches[self.branch_cursor..end] {
            branch.revealed = true;
        }
        self.branch_cursor = end;
    }

    fn reveal_leaves(&mut self) {
        if self.leaf_cursor == 0 && !self.leaves.is_empty() {
            tracing::debug!(branches_out = self.branch_cursor, "leaves starting");
        }
        let (lo, hi) = self.config.opacity_band();
        let end = (self.leaf_cursor + self.schedule.leaves_per_frame).min(self.leaves.len());
        for leaf in &mut self.leaves[self.leaf_cursor..end] {
            leaf.revealed = true;
            leaf.opacity = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
        }
        self.leaf_cursor = end;
    }

    fn particles_ready(&self, elapsed: Duration) -> bool {
        if self.particle_rate <= 0.0 || elapsed < self.schedule.reveal {
            return false;
        }
        let needed = self.leaves.len() as f64 * self.config.particle_ready_fraction.clamp(0.0, 1.0);
        self.leaf_cursor as f64 >= needed.ceil()
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            phase: self.phase,
            branches: &self.branches,
            leaves: &self.leaves,
            particles: self.particles.particles(),
            bounds: self.bounds,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    /// True while a frame subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.on_frame.is_some()
    }

    pub fn branch_cursor(&self) -> usize {
        self.branch_cursor
    }

    pub fn leaf_cursor(&self) -> usize {
        self.leaf_cursor
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn leaves(&self) -> &[LeafSite] {
        &self.leaves
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }
}
