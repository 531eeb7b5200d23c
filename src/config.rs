use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Timing knobs for the growth animation. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Shortest total branch reveal, however small the tree.
    pub min_reveal_ms: u64,
    /// Reveal time budgeted per branch for large trees.
    pub per_branch_ms: u64,
    /// Nominal frame length used to size the per-frame quota.
    pub frame_interval_ms: u64,
    /// Fraction of the reveal duration before leaves start appearing.
    pub leaf_start_fraction: f64,
    /// Frames over which all leaves are revealed.
    pub leaf_reveal_frames: u32,
    /// Extra time after the reveal duration before the tree counts as settled.
    pub settle_delay_ms: u64,
    pub leaf_opacity_min: f32,
    pub leaf_opacity_max: f32,
    /// Share of leaves that must be out before particles may spawn.
    pub particle_ready_fraction: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            min_reveal_ms: 1500,
            per_branch_ms: 8,
            frame_interval_ms: 16,
            leaf_start_fraction: 0.7,
            leaf_reveal_frames: 60,
            settle_delay_ms: 1000,
            leaf_opacity_min: 0.7,
            leaf_opacity_max: 1.0,
            particle_ready_fraction: 0.9,
        }
    }
}

impl AnimationConfig {
    /// Total branch reveal time for a tree with `branches` segments.
    pub fn reveal_duration(&self, branches: usize) -> Duration {
        let scaled = self.per_branch_ms.saturating_mul(branches as u64);
        Duration::from_millis(self.min_reveal_ms.max(scaled))
    }

    /// Branches to reveal per frame so the whole list fits the duration.
    pub fn branches_per_frame(&self, branches: usize) -> usize {
        let duration = self.reveal_duration(branches).as_millis() as f64;
        let frames = (duration / self.frame_interval_ms.max(1) as f64).max(1.0);
        ((branches as f64 / frames).ceil() as usize).max(1)
    }

    pub fn leaves_per_frame(&self, leaves: usize) -> usize {
        let frames = self.leaf_reveal_frames.max(1) as f64;
        ((leaves as f64 / frames).ceil() as usize).max(1)
    }

    pub fn leaf_start(&self, branches: usize) -> Duration {
        let total = self.reveal_duration(branches).as_millis() as f64;
        Duration::from_millis((total * self.leaf_start_fraction.clamp(0.0, 1.0)).round() as u64)
    }

    pub fn settle_after(&self, branches: usize) -> Duration {
        self.reveal_duration(branches)
            .saturating_add(Duration::from_millis(self.settle_delay_ms))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Opacity band with the ends put in order and clamped to `[0, 1]`.
    pub fn opacity_band(&self) -> (f32, f32) {
        let lo = self.leaf_opacity_min.clamp(0.0, 1.0);
        let hi = self.leaf_opacity_max.clamp(0.0, 1.0);
        (lo.min(hi), lo.max(hi))
    }
}

/// Configuration for one `grow` run
#[derive(Clone, Debug)]
pub struct GrowConfig {
    pub score: f64,
    pub seed: Option<u64>,
    pub live: bool,
    pub print: bool,
    /// Frame interval in seconds, overriding the settings file.
    pub time_step: Option<f32>,
    pub rules: Option<usize>,
    pub display_name: Option<String>,
    pub languages: Vec<(String, f64)>,
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_trees_use_minimum_duration() {
        let cfg = AnimationConfig::default();
        assert_eq!(cfg.reveal_duration(10), Duration::from_millis(1500));
        assert_eq!(cfg.reveal_duration(1000), Duration::from_millis(8000));
    }

    #[test]
    fn quotas_are_at_least_one() {
        let cfg = AnimationConfig::default();
        assert_eq!(cfg.branches_per_frame(0), 1);
        assert_eq!(cfg.branches_per_frame(10), 1);
        assert_eq!(cfg.leaves_per_frame(0), 1);
        assert_eq!(cfg.leaves_per_frame(80), 2);
    }

    #[test]
    fn quota_covers_whole_list_in_time() {
        let cfg = AnimationConfig::default();
        for n in [1usize, 50, 187, 1000, 20_000] {
            let per = cfg.branches_per_frame(n);
            let frames = cfg.reveal_duration(n).as_millis() as f64 / cfg.frame_interval_ms as f64;
            assert!(per * frames.ceil() as usize >= n, "n={} per={} frames={}", n, per, frames);
        }
    }

    #[test]
    fn leaf_start_and_settle() {
        let cfg = AnimationConfig::default();
        assert_eq!(cfg.leaf_start(10), Duration::from_millis(1050));
        assert_eq!(cfg.settle_after(10), Duration::from_millis(2500));
    }

    #[test]
    fn huge_timings_saturate() {
        let cfg = AnimationConfig {
            min_reveal_ms: u64::MAX,
            per_branch_ms: u64::MAX,
            settle_delay_ms: u64::MAX,
            ..Default::default()
        };
        assert_eq!(cfg.reveal_duration(1_000), Duration::from_millis(u64::MAX));
        assert!(cfg.settle_after(1_000) >= cfg.reveal_duration(1_000));
        assert!(cfg.leaf_start(1_000) <= cfg.settle_after(1_000));
        assert_eq!(cfg.branches_per_frame(1_000), 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AnimationConfig = toml::from_str("min_reveal_ms = 500\nleaf_opacity_min = 0.9").unwrap();
        assert_eq!(cfg.min_reveal_ms, 500);
        assert_eq!(cfg.per_branch_ms, 8);
        assert_eq!(cfg.opacity_band(), (0.9, 1.0));
    }
}
