//! L-system string rewriting.
//!
//! A [`RuleSet`] maps single symbols to replacement sequences. Symbols with no
//! rule are copied through unchanged, so expansion never rejects input.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Axiom every preset starts from.
pub const AXIOM: &str = "X";

/// Symbols the turtle understands. Anything else is carried along inert.
pub const ALPHABET: [char; 6] = ['F', 'X', '+', '-', '[', ']'];

/// Problems with a user-authored rule set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule set is empty")]
    Empty,
    #[error("rule `{rule}` has no `=` or `->` separator")]
    MissingArrow { rule: String },
    #[error("rule `{rule}` must rewrite exactly one symbol")]
    BadPredecessor { rule: String },
    #[error("rule `{rule}` uses unknown symbol `{symbol}`")]
    UnknownSymbol { rule: String, symbol: char },
    #[error("rule `{rule}` has unbalanced brackets")]
    Unbalanced { rule: String },
}

/// Deterministic context-free production rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: HashMap<char, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the production for `predecessor`.
    pub fn with_rule(mut self, predecessor: char, successor: &str) -> Self {
        self.rules.insert(predecessor, successor.to_string());
        self
    }

    pub fn successor(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when every successor closes each bracket it opens.
    pub fn is_bracket_balanced(&self) -> bool {
        self.rules.values().all(|s| brackets_balanced(s))
    }

    /// Parses `"X=F[+X][-X]FX, F=FF"` (`->` also accepted, `,` or `;` between rules).
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let mut set = RuleSet::new();

        for raw in text.split([',', ';']) {
            let rule = raw.trim();
            if rule.is_empty() {
                continue;
            }

            let (lhs, rhs) = rule
                .split_once("->")
                .or_else(|| rule.split_once('='))
                .ok_or_else(|| RuleError::MissingArrow { rule: rule.to_string() })?;

            let mut lhs_chars = lhs.trim().chars();
            let predecessor = match (lhs_chars.next(), lhs_chars.next()) {
                (Some(c), None) if ALPHABET.contains(&c) => c,
                (Some(c), None) => {
                    return Err(RuleError::UnknownSymbol { rule: rule.to_string(), symbol: c })
                }
                _ => return Err(RuleError::BadPredecessor { rule: rule.to_string() }),
            };

            let successor: String = rhs.chars().filter(|c| !c.is_whitespace()).collect();
            if let Some(symbol) = successor.chars().find(|c| !ALPHABET.contains(c)) {
                return Err(RuleError::UnknownSymbol { rule: rule.to_string(), symbol });
            }
            if !brackets_balanced(&successor) {
                return Err(RuleError::Unbalanced { rule: rule.to_string() });
            }

            set.rules.insert(predecessor, successor);
        }

        if set.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(set)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&char> = self.rules.keys().collect();
        keys.sort();
        let parts: Vec<String> = keys
            .into_iter()
            .map(|k| format!("{}={}", k, self.rules[k]))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

fn brackets_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Rewrites `axiom` with `rules` exactly `iterations` times.
///
/// Each pass is a single left-to-right sweep into a fresh buffer; the loop is
/// bounded by `iterations`, never by reaching a fixed point.
pub fn expand(axiom: &str, rules: &RuleSet, iterations: u32) -> String {
    let mut current = axiom.to_string();

    for _ in 0..iterations {
        let grown: usize = current
            .chars()
            .map(|c| rules.successor(c).map_or(1, str::len))
            .sum();
        let mut next = String::with_capacity(grown);

        for c in current.chars() {
            match rules.successor(c) {
                Some(successor) => next.push_str(successor),
                None => next.push(c),
            }
        }

        current = next;
    }

    current
}

/// Built-in rule sets, indexed by [`select`].
pub mod presets {
    use super::RuleSet;

    /// Number of built-in rule sets.
    pub const COUNT: usize = 4;

    pub fn bushy() -> RuleSet {
        RuleSet::new().with_rule('X', "F[+X][-X]FX").with_rule('F', "FF")
    }

    pub fn leaning() -> RuleSet {
        RuleSet::new().with_rule('X', "F-[[X]+X]+F[+FX]-X").with_rule('F', "FF")
    }

    pub fn alternating() -> RuleSet {
        RuleSet::new().with_rule('X', "F[+X]F[-X]+X").with_rule('F', "F[+F]F")
    }

    pub fn wide() -> RuleSet {
        RuleSet::new().with_rule('X', "F[++X][--X]FX").with_rule('F', "F+F-F")
    }

    pub fn all() -> Vec<RuleSet> {
        vec![bushy(), leaning(), alternating(), wide()]
    }
}

/// Rule set bucket for a sanitized score: one bucket per 150 points, cycling.
pub fn select(score: f64, available: usize) -> usize {
    if available == 0 || !score.is_finite() || score <= 0.0 {
        return 0;
    }
    ((score / 150.0).floor() as u64 % available as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_example_tree() {
        let rules = presets::bushy();
        assert_eq!(expand("X", &rules, 0), "X");
        assert_eq!(expand("X", &rules, 1), "F[+X][-X]FX");
        assert_eq!(
            expand("X", &rules, 2),
            "FF[+F[+X][-X]FX][-F[+X][-X]FX]FFF[+X][-X]FX"
        );
    }

    #[test]
    fn unknown_symbols_pass_through() {
        let rules = RuleSet::new().with_rule('F', "FF");
        assert_eq!(expand("aFz", &rules, 2), "aFFFFz");
    }

    #[test]
    fn empty_rules_are_identity() {
        assert_eq!(expand("F[+X]", &RuleSet::new(), 5), "F[+X]");
    }

    #[test]
    fn balanced_rules_give_balanced_output() {
        for rules in presets::all() {
            assert!(rules.is_bracket_balanced());
            let out = expand(AXIOM, &rules, 4);
            let open = out.chars().filter(|&c| c == '[').count();
            let close = out.chars().filter(|&c| c == ']').count();
            assert_eq!(open, close);
        }
    }

    #[test]
    fn handles_large_expansions() {
        let out = expand(AXIOM, &presets::bushy(), 8);
        assert!(out.len() > 20_000);
    }

    #[test]
    fn parse_accepts_both_arrows() {
        let a = RuleSet::parse("X=F[+X][-X]FX, F=FF").unwrap();
        let b = RuleSet::parse("X -> F[+X][-X]FX; F -> FF").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, presets::bushy());
    }

    #[test]
    fn parse_rejects_malformed_rules() {
        assert_eq!(RuleSet::parse(" , "), Err(RuleError::Empty));
        assert!(matches!(RuleSet::parse("XF[+X]"), Err(RuleError::MissingArrow { .. })));
        assert!(matches!(RuleSet::parse("XY=F"), Err(RuleError::BadPredecessor { .. })));
        assert!(matches!(
            RuleSet::parse("X=F[+Q]"),
            Err(RuleError::UnknownSymbol { symbol: 'Q', .. })
        ));
        assert!(matches!(RuleSet::parse("X=F[+X"), Err(RuleError::Unbalanced { .. })));
    }

    #[test]
    fn display_is_parseable() {
        let rules = presets::alternating();
        assert_eq!(RuleSet::parse(&rules.to_string()).unwrap(), rules);
    }

    #[test]
    fn selection_cycles_every_150() {
        assert_eq!(select(0.0, 4), 0);
        assert_eq!(select(149.0, 4), 0);
        assert_eq!(select(150.0, 4), 1);
        assert_eq!(select(450.0, 4), 3);
        assert_eq!(select(600.0, 4), 0);
        assert_eq!(select(f64::NAN, 4), 0);
        assert_eq!(select(300.0, 0), 0);
    }

    #[test]
    fn preset_count_matches_list() {
        let all = presets::all();
        assert_eq!(all.len(), presets::COUNT);
        assert!(all.iter().all(RuleSet::is_bracket_balanced));
    }
}
