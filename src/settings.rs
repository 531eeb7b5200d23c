use crate::config::AnimationConfig;
use crate::error::{Error, Result};
use crate::grammar::{self, RuleSet};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub grammar: GrammarSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct GrammarSettings {
    /// Replacement rule sets, e.g. `"X=F[+X][-X]FX, F=FF"`.
    #[serde(default)]
    pub rule_sets: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Loads the user's settings, falling back to defaults on any problem.
    ///
    /// The fallback reason is handed back so it can be logged once a
    /// subscriber exists; the log directory itself comes from these settings.
    pub fn load() -> (Self, Option<Error>) {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> (Self, Option<Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }

        match Self::from_file(path) {
            Ok(settings) => (settings, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("arbor")
            .join("config.toml")
    }

    /// Rule sets to choose from: the user's valid ones, or the presets if none parse.
    pub fn rule_sets(&self) -> Vec<RuleSet> {
        let custom: Vec<RuleSet> = self
            .grammar
            .rule_sets
            .iter()
            .filter_map(|text| match RuleSet::parse(text) {
                Ok(rules) => Some(rules),
                Err(err) => {
                    tracing::warn!(%err, "skipping rule set");
                    None
                }
            })
            .collect();

        if custom.is_empty() {
            grammar::presets::all()
        } else {
            custom
        }
    }

    /// The rule set a score grows with. Selection cycles through however many
    /// sets are available; a forced index wraps around them.
    pub fn rule_set_for(&self, score: f64, forced: Option<usize>) -> RuleSet {
        let mut available = self.rule_sets();
        let index = match forced {
            Some(index) => index % available.len().max(1),
            None => grammar::select(score, available.len()),
        };
        if index < available.len() {
            available.swap_remove(index)
        } else {
            grammar::presets::bushy()
        }
    }
}
