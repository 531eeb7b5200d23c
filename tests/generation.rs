use arbor::grammar::{self, presets, RuleSet};
use arbor::params::{self, GenerationParameters};
use arbor::turtle::Turtle;
use arbor::{generate, generate_with, LeafKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn grow_still(score: f64, seed: u64) -> arbor::Tree {
    let params = params::map(score).without_jitter();
    let rules = presets::all().swap_remove(params.rule_set_index);
    let mut rng = StdRng::seed_from_u64(seed);
    generate_with(params, &rules, &Turtle::default().without_jitter(), &mut rng)
}

#[test]
fn same_seed_without_jitter_is_identical() {
    let a = grow_still(333.0, 17);
    let b = grow_still(333.0, 17);
    assert_eq!(a.branches, b.branches);
    assert_eq!(a.leaves, b.leaves);
}

#[test]
fn jittered_trees_are_reproducible_too() {
    assert_eq!(generate(812.0, Some(2024)), generate(812.0, Some(2024)));
}

#[test]
fn documented_expansion() {
    let rules = presets::bushy();
    let one = grammar::expand(grammar::AXIOM, &rules, 1);
    let two = grammar::expand(grammar::AXIOM, &rules, 2);
    assert_eq!(one, "F[+X][-X]FX");

    let by_hand: String = one
        .chars()
        .map(|c| rules.successor(c).map(str::to_string).unwrap_or_else(|| c.to_string()))
        .collect();
    assert_eq!(two, by_hand);
    assert!(two.len() > one.len());
}

#[test]
fn balanced_rules_give_balanced_sequences() {
    for rules in presets::all() {
        assert!(rules.is_bracket_balanced());
        for n in 0..6 {
            let seq = grammar::expand(grammar::AXIOM, &rules, n);
            assert_eq!(seq.matches('[').count(), seq.matches(']').count(), "{} x{}", rules, n);
        }
    }
}

#[test]
fn unbalanced_rules_still_interpret() {
    let rules = RuleSet::new().with_rule('X', "F]]X[[F[X").with_rule('F', "F+");
    assert!(!rules.is_bracket_balanced());

    let seq = grammar::expand(grammar::AXIOM, &rules, 4);
    assert_ne!(seq.matches('[').count(), seq.matches(']').count());

    let params = params::map(300.0);
    let mut rng = StdRng::seed_from_u64(1);
    let (branches, _) = Turtle::default().interpret(&seq, &params, &mut rng);
    assert!(!branches.is_empty());
}

#[test]
fn thickness_decays_with_depth() {
    let tree = grow_still(700.0, 5);
    let p = &tree.params;
    for b in &tree.branches {
        let expected = p.base_thickness * p.thickness_decay.powi(b.level as i32);
        assert!((b.thickness - expected).abs() < 1e-3, "level {} thickness {}", b.level, b.thickness);
    }

    for level in 1..=tree.max_level() {
        let parent = p.base_thickness * p.thickness_decay.powi(level as i32 - 1);
        let child = p.base_thickness * p.thickness_decay.powi(level as i32);
        assert!(child < parent);
    }
}

#[test]
fn zero_score_is_a_seed() {
    let p = params::map(0.0);
    assert_eq!(p.iteration_count, 0);
    assert_eq!(p, GenerationParameters::seed());

    let tree = generate(0.0, Some(3));
    assert!(tree.branches.is_empty());
    assert!(tree.leaves.is_empty());
}

#[test]
fn huge_scores_hit_the_caps() {
    for score in [1.0e6, 1.0e12, f64::MAX] {
        let p = params::map(score);
        assert_eq!(p.iteration_count, 6);
        assert_eq!(p.base_segment_length, 35.0);
        assert_eq!(p.base_thickness, 15.0);
        assert_eq!(p.leaf_density_target, 80);
        assert!(p.palette_index < 5);
        assert!(p.rule_set_index < presets::COUNT);
        assert!(p.base_angle_degrees >= 22.5 && p.base_angle_degrees < 32.5);
    }
}

#[test]
fn score_600_end_to_end() {
    let params = params::map(600.0);
    assert_eq!(params.iteration_count, 5);
    assert_eq!(params.rule_set_index, 0);

    let tree = generate_with(
        params,
        &presets::bushy(),
        &Turtle::default(),
        &mut StdRng::seed_from_u64(600),
    );
    assert!(!tree.branches.is_empty());
    assert!(tree.max_level() <= tree.params.iteration_count);
    assert!(tree.leaves.len() <= tree.params.leaf_density_target as usize);
    assert!(tree.leaves.iter().any(|l| l.kind == LeafKind::Leaf));
}

#[test]
fn trees_grow_upward_from_the_root() {
    let tree = generate(450.0, Some(12));
    let first = &tree.branches[0];
    assert_eq!(first.start, glam::Vec2::ZERO);
    assert!(first.end.y > 0.0);
    assert_eq!(first.level, 0);
    assert!(tree.bounds().max.y > 0.0);
}
