//! High score persistence: one decimal number in a text file.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{error, info, warn};

use crate::error::StoreError;

/// Where the session keeps its best score between runs.
///
/// Neither call may fail the caller: a missing or broken store loads as 0,
/// and a failed save is logged and dropped.
pub trait HighScoreStore {
    fn load(&self) -> u32;
    fn save(&mut self, score: u32);
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the new score is written to before replacing the real one.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes the staging file, then renames it over the target, so a crash
    /// mid-write leaves the previous score intact.
    fn write(&self, score: u32) -> io::Result<()> {
        let staging = self.staging_path();
        fs::write(&staging, format!("{score}\n"))?;
        fs::rename(&staging, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&staging);
        })
    }

    fn read(&self) -> Result<u32, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        parse_score(&text)
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> u32 {
        match self.read() {
            Ok(score) => score,
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "no high score file at {}, starting from 0",
                    self.path.display()
                );
                0
            }
            Err(err) => {
                warn!("{}: {err}; starting from 0", self.path.display());
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        match self.write(score) {
            Ok(()) => info!("saved high score {score} to {}", self.path.display()),
            Err(err) => error!(
                "failed to save high score {score} to {}: {err}",
                self.path.display()
            ),
        }
    }
}

/// Accepts `12` as well as the older float form `12.0`.
fn parse_score(text: &str) -> Result<u32, StoreError> {
    let line = text.lines().next().unwrap_or("").trim();
    if let Ok(score) = line.parse::<u32>() {
        return Ok(score);
    }
    match line.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 => {
            Ok(value as u32)
        }
        _ => Err(StoreError::Parse(line.to_string())),
    }
}
