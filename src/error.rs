use crate::grammar::RuleError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures at the edges of the crate: files, terminals, user-authored rules.
///
/// Generation itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid rule set: {0}")]
    Rule(#[from] RuleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
