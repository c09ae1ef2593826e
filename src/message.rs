//! Handles communication between the command dispatcher & the player.
//!
//! Every request carries a [`Responder`], and the player only answers once
//! the request has been fully applied, so a caller which has its answer knows
//! the player has already moved on.

use tokio::sync::oneshot;

use crate::{
    player::Status,
    song::{Playlist, Song},
};

/// The sending half of a request's reply.
pub type Responder<T> = oneshot::Sender<T>;

/// Every message the player understands.
#[derive(Debug)]
pub enum Message {
    /// Starts or resumes playback, optionally switching to another playlist first.
    Play(Option<Playlist>, Responder<Play>),

    /// Stops playback, keeping the current position.
    Stop(Responder<Stopped>),

    /// Pauses playback, or unpauses it if it's already paused.
    Toggle(Responder<Toggled>),

    /// Skips forward by one song.
    Next(Responder<Skipped>),

    /// Skips backward by one song.
    Previous(Responder<Skipped>),

    /// Change the volume of playback, by a relative amount.
    ChangeVolume(f32, Responder<Volume>),

    /// Appends songs to the current playlist, if it's still the one with this id.
    Append {
        playlist: i64,
        songs: Vec<Song>,
        reply: Responder<usize>,
    },

    /// Requests a copy of the current state.
    Snapshot(Responder<Snapshot>),

    /// Sent by the waiter when the song with this generation finished by itself.
    Ended(u64),

    /// Quits gracefully.
    Quit,
}

/// What happened after a [`Message::Play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    /// Whether the playlist was switched before starting.
    pub switched: bool,

    /// The name of the playlist that's now selected.
    pub playlist: String,

    /// What playback did.
    pub started: Started,
}

/// The part of [`Play`] which describes playback itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Started {
    /// A song started playing, with this title.
    Playing(String),

    /// Paused playback was resumed.
    Resumed,

    /// Nothing to do, it was already playing.
    Already,

    /// The playlist has no songs.
    Empty,

    /// Every song in the playlist failed to load.
    Failed(String),
}

/// What happened after a [`Message::Stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// Playback was stopped at this index.
    At(usize),

    /// There was nothing to stop.
    Idle,
}

/// What happened after a [`Message::Toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Paused,
    Resumed,
    Idle,
}

/// What happened after a [`Message::Next`] or [`Message::Previous`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// A new song is now playing.
    Playing { index: usize, title: String },

    /// Nothing was playing, so only the position moved.
    Moved(usize),

    /// The end of the playlist was reached without looping, so playback stopped.
    Halted(usize),

    /// There are no songs to skip between.
    Empty,
}

/// What happened after a [`Message::ChangeVolume`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volume {
    /// The volume is now this, from 0 to 1.
    Set(f32),

    /// Nothing is playing, so nothing was changed.
    Idle,
}

/// A copy of the player's state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub playlist: Playlist,
    pub index: usize,
    pub status: Status,
    pub volume: f32,

    /// The last song which couldn't be played, and why.
    pub failure: Option<String>,
}

impl Snapshot {
    /// The song the position currently points at.
    pub fn current(&self) -> Option<&Song> {
        self.playlist.get(self.index)
    }
}
