//! Has the structs describing songs & playlists, as well
//! as the code which turns a song on disk into something playable.
//!
//! Songs come from two places:
//! 1. The catalog, in which case they carry the identity assigned by the database.
//! 2. Paths given at launch, which are "transient" and have an `id` of `0`.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rodio::Decoder;

pub mod error;
pub mod format;
pub mod scan;
pub use error::{Error, Result};

use crate::song::error::WithTrackContext as _;

/// Just a shorthand for a decoded file.
pub type Decoded = Decoder<BufReader<File>>;

/// A single song, which is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// The identity assigned by the catalog, `0` for transient songs.
    pub id: i64,

    /// The display title.
    pub title: String,

    /// Where the song lives on disk.
    pub path: PathBuf,
}

impl Song {
    /// Builds a song that isn't backed by the catalog, deriving
    /// the title from the file name.
    pub fn transient(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let title = format::title(&path)?;

        Ok(Self { id: 0, title, path })
    }

    /// Opens & decodes the song, which can then be appended to a [`rodio::Sink`].
    pub fn decode(&self) -> Result<Decoded> {
        let file = File::open(&self.path).track(&self.title)?;
        let decoder = Decoder::new(BufReader::new(file)).track(&self.title)?;

        Ok(decoder)
    }
}

/// An ordered list of songs.
///
/// The order is significant, since it's what next & previous traverse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Playlist {
    /// The identity in the catalog, `0` for the ad-hoc playlist.
    pub id: i64,

    /// The name of the playlist, used to select it.
    pub name: String,

    /// The songs themselves.
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Creates a playlist which only exists in memory.
    pub fn adhoc(name: impl Into<String>, songs: Vec<Song>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            songs,
        }
    }

    /// Whether the playlist is stored in the catalog.
    pub const fn saved(&self) -> bool {
        self.id != 0
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }
}

/// Collects transient songs from either a single file or a whole directory.
pub fn collect(path: &Path) -> Result<Vec<Song>> {
    if path.is_dir() {
        scan::audio_files(path)
            .into_iter()
            .map(Song::transient)
            .collect()
    } else {
        Ok(vec![Song::transient(path)?])
    }
}
