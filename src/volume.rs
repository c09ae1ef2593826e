use std::{num::ParseIntError, path::Path};
use tokio::fs;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't find config directory")]
    Directory,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing volume integer: {0}")]
    Parse(#[from] ParseIntError),
}

/// This is the representation of the persistent volume,
/// which is loaded at startup and saved on shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistentVolume {
    /// The volume, as a percentage.
    pub(crate) inner: u16,
}

impl PersistentVolume {
    /// Returns the volume as a float from 0 to 1.
    ///
    /// Hand edited files can hold anything, so values above 100% are capped.
    pub fn float(self) -> f32 {
        (f32::from(self.inner) / 100.0).min(1.0)
    }

    /// Loads the [`PersistentVolume`] from `volume.txt` in apollo's config directory.
    pub async fn load() -> Result<Self> {
        let config = crate::config_dir().map_err(|_| Error::Directory)?;
        Self::load_from(&config.join("volume.txt")).await
    }

    /// Reads the volume file at `path`, creating it at 100% if it's missing.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let volume = if path.exists() {
            let contents = fs::read_to_string(path).await?;
            let trimmed = contents.trim();
            let stripped = trimmed.strip_suffix("%").unwrap_or(trimmed);
            stripped.parse()?
        } else {
            fs::write(path, "100").await?;
            100u16
        };

        Ok(Self { inner: volume })
    }

    /// Saves `volume` to `volume.txt`.
    pub async fn save(volume: f32) -> Result<()> {
        let config = crate::config_dir().map_err(|_| Error::Directory)?;
        Self::save_to(&config.join("volume.txt"), volume).await
    }

    pub async fn save_to(path: &Path, volume: f32) -> Result<()> {
        // Already rounded & absolute, therefore this should be safe.
        #[expect(
            clippy::as_conversions,
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation
        )]
        let percentage = (volume * 100.0).abs().round() as u16;
        fs::write(path, percentage.to_string()).await?;

        Ok(())
    }
}
