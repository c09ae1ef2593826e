//! Maps each [`Request`] onto the player & the catalog, and words the reply.
//!
//! Nothing in here blocks on playback itself: the player answers as soon as
//! it has applied a request, which is all the dispatcher waits for.

use std::{fmt::Write as _, path::PathBuf, sync::Arc};

use tokio::task;
use tracing::debug;

use crate::{
    catalog::Catalog,
    config::Config,
    message::{Skipped, Started, Stopped, Toggled, Volume},
    player::{self, Status},
    protocol::{Request, Response},
    Error,
};

/// Handles requests, one [`Dispatcher::dispatch`] call per request.
///
/// Cloning is cheap, and each connection gets its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    player: player::Handle,
    catalog: Arc<Catalog>,
    config: Arc<Config>,
}

/// Formats a volume from 0 to 1 as a percentage.
fn percentage(volume: f32) -> String {
    format!("{}%", (volume * 100.0).round() as u16)
}

impl Dispatcher {
    pub const fn new(player: player::Handle, catalog: Arc<Catalog>, config: Arc<Config>) -> Self {
        Self {
            player,
            catalog,
            config,
        }
    }

    /// Handles a single request, always producing exactly one response.
    pub async fn dispatch(&self, request: Request) -> Response {
        debug!("dispatching {request:?}");

        let result = match request {
            Request::Play { playlist } => self.play(playlist).await,
            Request::Stop => self.stop().await,
            Request::Toggle => self.toggle().await,
            Request::Next => self.next().await,
            Request::Previous => self.previous().await,
            Request::Volume { delta } => self.volume(delta).await,
            Request::List => self.list(),
            Request::Playlist => self.playlist().await,
            Request::Playlists => self.playlists(),
            Request::Sync { directory } => self.sync(directory).await,
            Request::Create { name } => self.create(&name),
            Request::Delete { name } => self.delete(&name),
            Request::Add { ids } => self.add(ids).await,
            Request::Clean => self.clean().await,
            Request::Status => self.status().await,
            Request::Kill => Ok(String::from("Daemon killed")),
        };

        Response::from(result)
    }

    async fn play(&self, name: Option<String>) -> crate::Result<String> {
        let mut switch = None;
        if let Some(name) = name {
            let current = self.player.snapshot().await?;
            if name != current.playlist.name {
                let playlist = self
                    .catalog
                    .playlist(&name)?
                    .ok_or_else(|| Error::NotFound(format!("playlist '{name}'")))?;

                switch = Some(playlist);
            }
        }

        let play = self.player.play(switch).await?;
        let mut reply = String::new();
        if play.switched {
            let _ = writeln!(reply, "Switching playlist to '{}'", play.playlist);
        }

        match play.started {
            Started::Playing(title) => {
                let _ = write!(reply, "Playing song: {title}");
            }
            Started::Resumed => {
                let _ = write!(reply, "Unpausing '{}'", play.playlist);
            }
            Started::Already => reply.push_str("Already playing..."),
            Started::Empty => {
                let _ = write!(reply, "Can't play '{}', it has 0 songs", play.playlist);
            }
            Started::Failed(failure) => {
                let _ = write!(reply, "Nothing in '{}' could be played: {failure}", play.playlist);
            }
        }

        Ok(reply)
    }

    async fn stop(&self) -> crate::Result<String> {
        Ok(match self.player.stop().await? {
            Stopped::At(index) => format!("Stopping at index: {index}"),
            Stopped::Idle => String::from("Apollo is not playing anything..."),
        })
    }

    async fn toggle(&self) -> crate::Result<String> {
        Ok(String::from(match self.player.toggle().await? {
            Toggled::Paused => "Paused",
            Toggled::Resumed => "Resumed",
            Toggled::Idle => "No song playing...",
        }))
    }

    /// Words the outcome of a skip in either direction.
    fn skipped(direction: &str, skipped: Skipped) -> crate::Result<String> {
        match skipped {
            Skipped::Playing { index, title } => {
                Ok(format!("{direction} with index: {index}, playing '{title}'"))
            }
            Skipped::Moved(index) => Ok(format!("{direction} with index: {index}")),
            Skipped::Halted(index) => Ok(format!(
                "Reached the end of the playlist, stopping at index: {index}"
            )),
            Skipped::Empty => Err(Error::InvalidState(String::from("No songs in playlist"))),
        }
    }

    async fn next(&self) -> crate::Result<String> {
        Self::skipped("Next", self.player.next().await?)
    }

    async fn previous(&self) -> crate::Result<String> {
        Self::skipped("Previous", self.player.previous().await?)
    }

    async fn volume(&self, delta: f32) -> crate::Result<String> {
        Ok(match self.player.volume(delta).await? {
            Volume::Set(volume) => format!("Volume set to {}", percentage(volume)),
            Volume::Idle => String::from("No song playing..."),
        })
    }

    fn list(&self) -> crate::Result<String> {
        let songs = self.catalog.songs()?;
        if songs.is_empty() {
            return Ok(String::from("No songs registered, try `apollo sync`"));
        }

        let mut reply = String::new();
        for song in songs {
            let _ = writeln!(reply, "[{}] {} - {}", song.id, song.title, song.path.display());
        }

        Ok(reply)
    }

    async fn playlist(&self) -> crate::Result<String> {
        let snapshot = self.player.snapshot().await?;
        let playlist = &snapshot.playlist;

        let mut reply = format!("Playlist: [{}] {}\n", playlist.id, playlist.name);
        if playlist.is_empty() {
            reply.push_str("No songs");
            return Ok(reply);
        }

        for (i, song) in playlist.songs.iter().enumerate() {
            let marker = if i == snapshot.index { " <- [Selected]" } else { "" };
            let _ = writeln!(reply, "{}. {}{marker}", i + 1, song.title);
        }

        Ok(reply)
    }

    fn playlists(&self) -> crate::Result<String> {
        let summaries = self.catalog.playlists()?;
        if summaries.is_empty() {
            return Ok(String::from("No playlists, try `apollo create`"));
        }

        let mut reply = String::new();
        for summary in summaries {
            let _ = writeln!(
                reply,
                "[{}] {} ({} songs)",
                summary.id, summary.name, summary.songs
            );
        }

        Ok(reply)
    }

    async fn sync(&self, directory: Option<PathBuf>) -> crate::Result<String> {
        let directory = directory.unwrap_or_else(|| self.config.music_dir.clone());
        if directory.as_os_str().is_empty() || !directory.is_dir() {
            return Err(Error::NotFound(format!(
                "directory '{}'",
                directory.display()
            )));
        }

        // Scanning can take a while on big libraries.
        let catalog = Arc::clone(&self.catalog);
        let scanned = directory.clone();
        let added = task::spawn_blocking(move || catalog.sync(&scanned)).await??;

        Ok(format!(
            "Synced {added} new song(s) from '{}'",
            directory.display()
        ))
    }

    fn create(&self, name: &str) -> crate::Result<String> {
        Ok(if self.catalog.create(name)? {
            format!("Created playlist '{name}'")
        } else {
            format!("Playlist '{name}' already exists")
        })
    }

    fn delete(&self, name: &str) -> crate::Result<String> {
        Ok(if self.catalog.delete(name)? {
            format!("Deleted playlist '{name}'")
        } else {
            format!("Playlist '{name}' not found")
        })
    }

    async fn add(&self, ids: Vec<i64>) -> crate::Result<String> {
        let snapshot = self.player.snapshot().await?;
        let playlist = snapshot.playlist;
        if !playlist.saved() {
            return Err(Error::InvalidState(format!(
                "'{}' isn't a saved playlist, play one made with `apollo create` first",
                playlist.name
            )));
        }

        let songs = self.catalog.add(playlist.id, &ids)?;
        let associated = songs.len();
        let appended = self.player.append(playlist.id, songs).await?;

        Ok(Self::added(&playlist.name, associated, appended))
    }

    /// Words the outcome of an `add`.
    ///
    /// `associated` is what the catalog stored, and `appended` is what the
    /// player picked up, which is nothing if the playlist was switched meanwhile.
    pub(crate) fn added(name: &str, associated: usize, appended: usize) -> String {
        let mut reply = format!("Added {associated} song(s) to '{name}'");
        if appended < associated {
            reply.push_str(", which is no longer selected");
        }

        reply
    }

    async fn clean(&self) -> crate::Result<String> {
        // Checks every file in the catalog, so it's kept off the runtime.
        let catalog = Arc::clone(&self.catalog);
        let removed = task::spawn_blocking(move || catalog.clean()).await??;

        Ok(format!("Cleaned {removed} item(s) in the database"))
    }

    async fn status(&self) -> crate::Result<String> {
        let snapshot = self.player.snapshot().await?;
        let position = format!("{}/{}", snapshot.index + 1, snapshot.playlist.len());

        let mut reply = match (snapshot.status, snapshot.current()) {
            (Status::Idle, _) | (_, None) => {
                format!("Idle in '{}'", snapshot.playlist.name)
            }
            (status, Some(song)) => format!(
                "{} '{}' ({position}) from '{}', volume {}",
                if status == Status::Paused { "Paused" } else { "Playing" },
                song.title,
                snapshot.playlist.name,
                percentage(snapshot.volume),
            ),
        };

        if let Some(failure) = &snapshot.failure {
            let _ = write!(reply, "\nLast failure: {failure}");
        }

        Ok(reply)
    }
}
