//! The catalog of songs & named playlists, persisted with SQLite.
//!
//! Every operation takes the connection lock for its whole duration, so
//! callers never observe a half-applied change.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension as _};
use tracing::{debug, info};

use crate::song::{self, Playlist, Song};

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that might occur while reading or writing the catalog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("playlist with id {0} doesn't exist")]
    UnknownPlaylist(i64),
}

/// The schema, which is applied every time the catalog is opened.
const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS songs (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        path TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS playlist_songs (
        playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
        song_id INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        PRIMARY KEY (playlist_id, song_id)
    );
";

/// A short description of a playlist, as shown by `apollo playlists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub id: i64,
    pub name: String,
    pub songs: usize,
}

/// The song & playlist store.
pub struct Catalog {
    /// The connection, which isn't [`Sync`] by itself.
    conn: Mutex<Connection>,
}

/// Maps a row of `(id, title, path)` into a [`Song`].
fn song(row: &rusqlite::Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        path: PathBuf::from(row.get::<_, String>(2)?),
    })
}

impl Catalog {
    /// Opens (or creates) the catalog stored at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Creates a throwaway catalog which lives only in memory.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Applies the schema to a fresh connection.
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Every song in the catalog, ordered by id.
    pub fn songs(&self) -> Result<Vec<Song>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, title, path FROM songs ORDER BY id")?;
        let songs = stmt.query_map([], song)?.collect::<rusqlite::Result<_>>()?;

        Ok(songs)
    }

    /// Looks up the first song with exactly this title.
    pub fn song_titled(&self, title: &str) -> Result<Option<Song>> {
        let conn = self.conn.lock();
        let song = conn
            .query_row(
                "SELECT id, title, path FROM songs WHERE title = ?1 ORDER BY id LIMIT 1",
                params![title],
                song,
            )
            .optional()?;

        Ok(song)
    }

    /// Registers a song, returning whether it was actually new.
    ///
    /// Paths are unique, so registering the same file twice is a no-op.
    pub fn register(&self, title: &str, path: &Path) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO songs (title, path) VALUES (?1, ?2)",
            params![title, path.to_string_lossy()],
        )?;

        Ok(changed == 1)
    }

    /// Scans `directory` and registers every song that isn't already known.
    ///
    /// Files whose title can't be derived are skipped.
    pub fn sync(&self, directory: &Path) -> Result<usize> {
        let mut added = 0;
        for path in song::scan::audio_files(directory) {
            let Ok(title) = song::format::title(&path) else {
                debug!("skipping {}, no usable title", path.display());
                continue;
            };

            if self.register(&title, &path)? {
                added += 1;
            }
        }

        info!("synced {added} new song(s) from {}", directory.display());
        Ok(added)
    }

    /// Removes every song whose file no longer exists, returning how many were removed.
    pub fn clean(&self) -> Result<usize> {
        let missing: Vec<i64> = self
            .songs()?
            .into_iter()
            .filter(|song| !song.path.exists())
            .map(|song| song.id)
            .collect();

        let conn = self.conn.lock();
        let mut stmt = conn.prepare("DELETE FROM songs WHERE id = ?1")?;
        for id in &missing {
            stmt.execute(params![id])?;
        }

        Ok(missing.len())
    }

    /// Loads a named playlist along with its songs, in order.
    pub fn playlist(&self, name: &str) -> Result<Option<Playlist>> {
        let conn = self.conn.lock();
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM playlists WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        let Some(id) = id else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT s.id, s.title, s.path FROM songs s
             JOIN playlist_songs ps ON ps.song_id = s.id
             WHERE ps.playlist_id = ?1
             ORDER BY ps.position",
        )?;
        let songs = stmt
            .query_map(params![id], song)?
            .collect::<rusqlite::Result<_>>()?;

        Ok(Some(Playlist {
            id,
            name: name.to_owned(),
            songs,
        }))
    }

    /// Lists every playlist along with how many songs it has.
    pub fn playlists(&self) -> Result<Vec<Summary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, COUNT(ps.song_id) FROM playlists p
             LEFT JOIN playlist_songs ps ON ps.playlist_id = p.id
             GROUP BY p.id ORDER BY p.id",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(Summary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    songs: row.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        Ok(summaries)
    }

    /// Creates a playlist, returning `false` if one with that name already exists.
    pub fn create(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO playlists (name) VALUES (?1)",
            params![name],
        )?;

        Ok(changed == 1)
    }

    /// Deletes a playlist & its memberships, returning `false` if it didn't exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM playlists WHERE name = ?1", params![name])?;

        Ok(changed == 1)
    }

    /// Associates songs with a playlist, appending them after its current songs.
    ///
    /// Duplicate ids, unknown ids and songs already in the playlist are ignored.
    /// The songs which were actually added are returned in the order requested.
    pub fn add(&self, playlist: i64, ids: &[i64]) -> Result<Vec<Song>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM playlists WHERE id = ?1)",
            params![playlist],
            |row| row.get(0),
        )?;

        if !exists {
            return Err(Error::UnknownPlaylist(playlist));
        }

        let mut position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_songs WHERE playlist_id = ?1",
            params![playlist],
            |row| row.get(0),
        )?;

        let mut seen = HashSet::new();
        let mut added = Vec::new();
        {
            let mut lookup = tx.prepare("SELECT id, title, path FROM songs WHERE id = ?1")?;
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO playlist_songs (playlist_id, song_id, position)
                 VALUES (?1, ?2, ?3)",
            )?;

            for id in ids.iter().filter(|id| seen.insert(**id)) {
                let Some(song) = lookup.query_row(params![id], song).optional()? else {
                    debug!("song {id} doesn't exist, not adding it to playlist {playlist}");
                    continue;
                };

                if insert.execute(params![playlist, id, position])? == 1 {
                    position += 1;
                    added.push(song);
                }
            }
        }

        tx.commit()?;
        Ok(added)
    }
}
