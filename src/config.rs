//! Game constants, gathered into one immutable value handed to the session.
//!
//! Defaults reproduce the classic 360x640 board. A `flappy.toml` in the
//! working directory may override any field.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "flappy.toml";

/// Largest magnitude accepted for any length or velocity, so tick arithmetic
/// stays far inside `i32`.
pub const MAX_UNITS: i32 = 1 << 16;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub board_width: i32,
    pub board_height: i32,

    /// Defaults to `board_width / 8`.
    pub bird_start_x: Option<i32>,
    /// Defaults to `board_width / 2`.
    pub bird_start_y: Option<i32>,
    pub bird_width: i32,
    pub bird_height: i32,

    pub pipe_base_y: i32,
    pub pipe_width: i32,
    pub pipe_height: i32,

    /// Added to the bird's vertical velocity every tick (positive = down).
    pub gravity: i32,
    /// Horizontal pipe movement per tick (negative = leftward).
    pub pipe_velocity: i32,
    /// Vertical velocity set by a jump (negative = up).
    pub jump_velocity: i32,

    pub tick_rate_hz: u32,
    pub spawn_interval_ms: u64,

    pub high_score_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
    /// Fixed spawner seed; a random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let board_width = 360;
        let board_height = 640;
        Self {
            board_width,
            board_height,
            bird_start_x: None,
            bird_start_y: None,
            bird_width: 34,
            bird_height: 24,
            pipe_base_y: 0,
            pipe_width: 64,
            pipe_height: 512,
            gravity: 1,
            pipe_velocity: -4,
            jump_velocity: -9,
            tick_rate_hz: 60,
            spawn_interval_ms: 1500,
            high_score_path: PathBuf::from("highscore.txt"),
            log_path: PathBuf::from("flappy.log"),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("board_width", self.board_width),
            ("board_height", self.board_height),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
            ("pipe_width", self.pipe_width),
            ("pipe_height", self.pipe_height),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        let bounded = [
            ("bird_start_x", self.bird_start_x()),
            ("bird_start_y", self.bird_start_y()),
            ("pipe_base_y", self.pipe_base_y),
            ("gravity", self.gravity),
            ("pipe_velocity", self.pipe_velocity),
            ("jump_velocity", self.jump_velocity),
        ];
        for (field, value) in positive.into_iter().chain(bounded) {
            if value.unsigned_abs() > MAX_UNITS.unsigned_abs() {
                return Err(invalid(
                    field,
                    format!("must be within ±{MAX_UNITS}, got {value}"),
                ));
            }
        }
        if self.gravity < 0 {
            return Err(invalid("gravity", "must not be negative"));
        }
        if self.pipe_velocity >= 0 {
            return Err(invalid("pipe_velocity", "pipes must move left (negative)"));
        }
        if self.jump_velocity >= 0 {
            return Err(invalid("jump_velocity", "a jump must point up (negative)"));
        }
        if self.tick_rate_hz == 0 {
            return Err(invalid("tick_rate_hz", "must be positive"));
        }
        if self.spawn_interval_ms == 0 {
            return Err(invalid("spawn_interval_ms", "must be positive"));
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn bird_start_x(&self) -> i32 {
        self.bird_start_x.unwrap_or(self.board_width / 8)
    }

    pub fn bird_start_y(&self) -> i32 {
        self.bird_start_y.unwrap_or(self.board_width / 2)
    }

    /// Vertical gap between the two pipes of a pair.
    pub fn opening_space(&self) -> i32 {
        self.board_height / 4
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn log_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| invalid("log_level", format!("unknown level `{}`", self.log_level)))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_board() {
        let c = GameConfig::default();
        assert_eq!((c.board_width, c.board_height), (360, 640));
        assert_eq!((c.bird_start_x(), c.bird_start_y()), (45, 180));
        assert_eq!((c.bird_width, c.bird_height), (34, 24));
        assert_eq!((c.pipe_width, c.pipe_height), (64, 512));
        assert_eq!(c.opening_space(), 160);
        assert_eq!(c.jump_velocity, -9);
        assert_eq!(c.spawn_period(), Duration::from_millis(1500));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = GameConfig::from_toml("gravity = 2\nseed = 7\n").unwrap();
        assert_eq!(c.gravity, 2);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.board_width, 360);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = GameConfig::from_toml("gravityy = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GameConfig::from_toml("pipe_velocity = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pipe_velocity", .. }));

        let err = GameConfig::from_toml("board_height = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "board_height", .. }));

        let err = GameConfig::from_toml("log_level = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "log_level", .. }));
    }

    #[test]
    fn test_start_position_follows_board_width() {
        let c = GameConfig::from_toml("board_width = 200\n").unwrap();
        assert_eq!((c.bird_start_x(), c.bird_start_y()), (25, 100));

        let text = "board_width = 200\nbird_start_y = 300\n";
        let c = GameConfig::from_toml(text).unwrap();
        assert_eq!((c.bird_start_x(), c.bird_start_y()), (25, 300));
    }

    #[test]
    fn test_oversized_values_rejected() {
        let err = GameConfig::from_toml("gravity = 2147483647\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "gravity", .. }));

        let err = GameConfig::from_toml("board_height = 2147483647\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "board_height", .. }));

        let err = GameConfig::from_toml("jump_velocity = -2147483648\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "jump_velocity", .. }));

        let at_limit = format!("gravity = {MAX_UNITS}\n");
        assert!(GameConfig::from_toml(&at_limit).is_ok());
    }

    fn temp_config(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "flappy-classic-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_existing_file() {
        let path = temp_config("good", "gravity = 2\nhigh_score_path = \"best.txt\"\n");
        let c = GameConfig::load(&path).unwrap();
        assert_eq!(c.gravity, 2);
        assert_eq!(c.high_score_path, PathBuf::from("best.txt"));
        assert_eq!(c.board_width, 360);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_bad_file_reports_its_path() {
        let path = temp_config("bad", "gravity = \"heavy\"\n");
        match GameConfig::load(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected parse error, got {other:?}"),
        }

        let invalid_path = temp_config("invalid", "tick_rate_hz = 0\n");
        let err = GameConfig::load(&invalid_path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tick_rate_hz", .. }));

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(&invalid_path);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("flappy-classic-no-such-config.toml");
        let _ = fs::remove_file(&path);
        assert_eq!(GameConfig::load(&path).unwrap(), GameConfig::default());
    }
}
