//! The user configuration, stored as `config.json` in apollo's config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

/// The address the daemon listens on, unless configured otherwise.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:42069";

/// Settings read at startup and written back on shutdown.
///
/// Missing fields fall back to their defaults, so older files keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanned by `sync` when no directory is given.
    pub music_dir: PathBuf,

    /// Whether playback starts over after the last song.
    #[serde(rename = "loop")]
    pub looping: bool,

    /// Where the daemon listens for commands.
    pub address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_dir: dirs::audio_dir().unwrap_or_default(),
            looping: true,
            address: String::from(DEFAULT_ADDRESS),
        }
    }
}

impl Config {
    /// The path of `config.json`.
    pub fn path() -> crate::Result<PathBuf> {
        Ok(crate::config_dir()?.join("config.json"))
    }

    /// Loads the configuration, see [`Config::load_from`].
    pub async fn load() -> crate::Result<Self> {
        Self::load_from(&Self::path()?).await
    }

    /// Reads the configuration at `path`.
    ///
    /// A missing file gives the defaults, and so does one that can't be
    /// parsed, although that case is logged since it's probably a typo.
    pub async fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|error| {
            warn!("{} is invalid, using defaults: {error}", path.display());
            Self::default()
        }))
    }

    pub async fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::path()?).await
    }

    pub async fn save_to(&self, path: &Path) -> crate::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).await?;

        Ok(())
    }
}
