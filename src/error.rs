use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading `flappy.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures reading the high score file. Never surfaced to the player.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file unreadable: {0}")]
    Io(#[from] io::Error),

    #[error("high score file holds `{0}`, not a number")]
    Parse(String),
}

/// Anything that stops the game from starting or the terminal from working.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}
