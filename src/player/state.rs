//! The playback state machine, without any of the audio.
//!
//! Every transition mutates the [`State`] and returns at most one [`Signal`],
//! which the player then applies to the output device.

use crate::{
    message::{Play, Skipped, Started, Stopped, Toggled},
    song::{Playlist, Song},
};

/// Whether anything is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl Status {
    /// Whether a song is loaded, paused or not.
    pub const fn active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// The closed set of instructions for the output device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Pause,
    Resume,

    /// Change the volume by a relative amount.
    Volume(f32),

    /// Drop the current song.
    Stop,

    /// Drop the current song, if any, and start the one at this index.
    SkipTo(usize),
}

/// The position & status of playback.
///
/// Invariants: `Paused` implies a song is loaded, and whenever the
/// status is active `index` points at a song in `playlist`.
#[derive(Debug, Clone)]
pub struct State {
    pub playlist: Playlist,
    pub index: usize,
    pub status: Status,

    /// Whether reaching the end of the playlist starts it over.
    pub looping: bool,
}

impl State {
    pub const fn new(playlist: Playlist, looping: bool) -> Self {
        Self {
            playlist,
            index: 0,
            status: Status::Idle,
            looping,
        }
    }

    /// The song at the current position.
    pub fn current(&self) -> Option<&Song> {
        self.playlist.get(self.index)
    }

    /// The title of the song at the current position, or an empty string.
    fn title(&self) -> String {
        self.current()
            .map(|song| song.title.clone())
            .unwrap_or_default()
    }

    /// Starts playback, switching to `switch` first if it's a different playlist.
    pub fn play(&mut self, switch: Option<Playlist>) -> (Play, Option<Signal>) {
        let mut signal = None;
        let mut switched = false;

        if let Some(playlist) = switch.filter(|x| x.name != self.playlist.name) {
            if self.status.active() {
                signal = Some(Signal::Stop);
                self.status = Status::Idle;
            }

            self.playlist = playlist;
            self.index = 0;
            switched = true;
        }

        let started = match self.status {
            Status::Idle if self.playlist.is_empty() => Started::Empty,
            Status::Idle => {
                if self.index >= self.playlist.len() {
                    self.index = 0;
                }

                self.status = Status::Playing;
                signal = Some(Signal::SkipTo(self.index));
                Started::Playing(self.title())
            }
            Status::Paused => {
                self.status = Status::Playing;
                signal = Some(Signal::Resume);
                Started::Resumed
            }
            Status::Playing => Started::Already,
        };

        let play = Play {
            switched,
            playlist: self.playlist.name.clone(),
            started,
        };

        (play, signal)
    }

    pub fn stop(&mut self) -> (Stopped, Option<Signal>) {
        if self.status.active() {
            self.status = Status::Idle;
            (Stopped::At(self.index), Some(Signal::Stop))
        } else {
            (Stopped::Idle, None)
        }
    }

    pub fn toggle(&mut self) -> (Toggled, Option<Signal>) {
        match self.status {
            Status::Playing => {
                self.status = Status::Paused;
                (Toggled::Paused, Some(Signal::Pause))
            }
            Status::Paused => {
                self.status = Status::Playing;
                (Toggled::Resumed, Some(Signal::Resume))
            }
            Status::Idle => (Toggled::Idle, None),
        }
    }

    /// Only wraps around while idle or when looping, see [`State::advance`].
    pub fn next(&mut self) -> (Skipped, Option<Signal>) {
        if self.playlist.is_empty() {
            return (Skipped::Empty, None);
        }

        if !self.status.active() {
            self.index = (self.index + 1) % self.playlist.len();
            return (Skipped::Moved(self.index), None);
        }

        match self.advance() {
            signal @ Signal::SkipTo(index) => (
                Skipped::Playing {
                    index,
                    title: self.title(),
                },
                Some(signal),
            ),
            signal => (Skipped::Halted(self.index), Some(signal)),
        }
    }

    /// Always wraps from the first song to the last, regardless of looping.
    pub fn previous(&mut self) -> (Skipped, Option<Signal>) {
        if self.playlist.is_empty() {
            return (Skipped::Empty, None);
        }

        self.index = if self.index == 0 || self.index >= self.playlist.len() {
            self.playlist.len() - 1
        } else {
            self.index - 1
        };

        if self.status.active() {
            self.status = Status::Playing;
            let skipped = Skipped::Playing {
                index: self.index,
                title: self.title(),
            };

            (skipped, Some(Signal::SkipTo(self.index)))
        } else {
            (Skipped::Moved(self.index), None)
        }
    }

    /// Volume only means something while a song is loaded.
    pub const fn volume(&self, delta: f32) -> Option<Signal> {
        if self.status.active() {
            Some(Signal::Volume(delta))
        } else {
            None
        }
    }

    /// Called when the current song ended by itself, or couldn't be loaded.
    pub fn finished(&mut self) -> Option<Signal> {
        self.status.active().then(|| self.advance())
    }

    /// Moves onto the following song while playing.
    ///
    /// Past the last song this either starts over, if looping,
    /// or halts playback and leaves the position on the last song.
    fn advance(&mut self) -> Signal {
        if self.index + 1 < self.playlist.len() {
            self.index += 1;
        } else if self.looping && !self.playlist.is_empty() {
            self.index = 0;
        } else {
            self.status = Status::Idle;
            return Signal::Stop;
        }

        self.status = Status::Playing;
        Signal::SkipTo(self.index)
    }

    /// Appends songs if `playlist` is still the selected one, returning how many were added.
    pub fn append(&mut self, playlist: i64, songs: Vec<Song>) -> usize {
        if self.playlist.id != playlist {
            return 0;
        }

        let added = songs.len();
        self.playlist.songs.extend(songs);

        added
    }
}
