//! Presentation metadata that travels with a score.
//!
//! None of this reaches the geometry; it only feeds the caption.

use crate::params::{self, GenerationParameters, TreeStage};

#[derive(Debug, Clone, Default)]
pub struct ActivityProfile {
    pub score: f64,
    pub display_name: Option<String>,
    /// Language name and weight (bytes, repo size, anything comparable).
    pub languages: Vec<(String, f64)>,
}

impl ActivityProfile {
    pub fn new(score: f64) -> Self {
        Self {
            score: params::sanitize(score),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        self.display_name = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Adds weight to a language, merging repeated names.
    pub fn with_language(mut self, name: impl Into<String>, weight: f64) -> Self {
        let name = name.into();
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        match self.languages.iter_mut().find(|(n, _)| *n == name) {
            Some((_, w)) => *w += weight,
            None => self.languages.push((name, weight)),
        }
        self
    }

    /// Heaviest language; ties go to the one listed first.
    pub fn primary_language(&self) -> &str {
        self.languages
            .iter()
            .fold(None::<&(String, f64)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(name, _)| name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn stage(&self) -> TreeStage {
        TreeStage::from_score(self.score)
    }

    /// Lines shown beside the tree.
    pub fn caption(&self, params: &GenerationParameters) -> Vec<String> {
        let title = match &self.display_name {
            Some(name) => format!("{}'s tree", name),
            None => "Activity tree".to_string(),
        };
        let mut lines = vec![
            title,
            format!("Stage: {}", self.stage()),
            format!("Score: {}", self.score.floor() as u64),
            format!("Season: {:?}", params.season()),
        ];
        if !self.languages.is_empty() {
            lines.push(format!("Top language: {}", self.primary_language()));
        }
        lines
    }
}

/// Parses `NAME=WEIGHT`; a bare name counts as weight 1.
pub fn parse_language(arg: &str) -> Result<(String, f64), String> {
    let (name, weight) = match arg.split_once('=') {
        Some((name, weight)) => {
            let weight = weight
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid weight in `{}`", arg))?;
            (name.trim(), weight)
        }
        None => (arg.trim(), 1.0),
    };
    if name.is_empty() {
        return Err(format!("missing language name in `{}`", arg));
    }
    Ok((name.to_string(), weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_language_picks_heaviest() {
        let p = ActivityProfile::new(10.0)
            .with_language("Rust", 300.0)
            .with_language("Go", 120.0)
            .with_language("Go", 250.0);
        assert_eq!(p.primary_language(), "Go");
        assert_eq!(p.languages.len(), 2);
    }

    #[test]
    fn no_languages_is_unknown() {
        assert_eq!(ActivityProfile::new(10.0).primary_language(), "Unknown");
    }

    #[test]
    fn ties_keep_first() {
        let p = ActivityProfile::new(1.0).with_language("C", 5.0).with_language("Zig", 5.0);
        assert_eq!(p.primary_language(), "C");
    }

    #[test]
    fn caption_mentions_name_and_stage() {
        let p = ActivityProfile::new(480.0).with_name("  octocat ").with_language("Rust", 1.0);
        let lines = p.caption(&params::map(480.0));
        assert_eq!(lines[0], "octocat's tree");
        assert!(lines.contains(&"Stage: Mature Tree".to_string()));
        assert!(lines.contains(&"Top language: Rust".to_string()));
    }

    #[test]
    fn blank_name_is_dropped_and_bad_score_sanitized() {
        let p = ActivityProfile::new(f64::NAN).with_name("   ");
        assert!(p.display_name.is_none());
        assert_eq!(p.score, 0.0);
        assert_eq!(p.stage(), TreeStage::Seed);
    }

    #[test]
    fn language_args() {
        assert_eq!(parse_language("Rust=42.5"), Ok(("Rust".to_string(), 42.5)));
        assert_eq!(parse_language("Go"), Ok(("Go".to_string(), 1.0)));
        assert!(parse_language("=3").is_err());
        assert!(parse_language("Rust=lots").is_err());
    }
}
