use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

pub const NOTE_EXTENSION: &str = "txt";
pub const QUIET_PERIOD: Duration = Duration::from_millis(500);
pub const PREVIEW_CHARS: usize = 800;
pub const COMPACT_HELP_WIDTH: u16 = 70;

const HOME_ENV: &str = "TERMNOTES_HOME";
pub const LOG_ENV: &str = "TERMNOTES_LOG";

/// Where everything lives on disk, plus the fixed tuning knobs.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub notes_dir: PathBuf,
    pub favorites_file: PathBuf,
    pub log_file: PathBuf,
    pub extension: &'static str,
    pub quiet_period: Duration,
    pub preview_chars: usize,
}

impl Config {
    /// `$TERMNOTES_HOME` wins, otherwise the platform data directory.
    pub fn resolve() -> Result<Self> {
        let base = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => get_data_dir()?,
        };
        Ok(Self::with_base_dir(base))
    }

    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        let base_dir = base.as_ref().to_path_buf();
        Self {
            notes_dir: base_dir.join("notes"),
            favorites_file: base_dir.join("favorites.json"),
            log_file: base_dir.join("termnotes.log"),
            base_dir,
            extension: NOTE_EXTENSION,
            quiet_period: QUIET_PERIOD,
            preview_chars: PREVIEW_CHARS,
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.notes_dir)?;
        Ok(())
    }
}

fn get_data_dir() -> Result<PathBuf> {
    if let Some(data_home) = dirs::data_dir() {
        Ok(data_home.join("termnotes"))
    } else {
        Err(anyhow::anyhow!("Could not determine data directory"))
    }
}
