//! Responsible for playing songs & keeping track of the position.
//!
//! The [`Player`] is a single task which owns both the [`State`] and the
//! audio output. Requests from the dispatcher & the waiter all arrive on
//! the same queue, so they're applied one at a time in the order they
//! were sent, and nothing else ever touches the state.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    audio::{waiter, Output},
    message::{Play, Responder, Skipped, Snapshot, Started, Stopped, Toggled, Volume},
    song::{Playlist, Song},
    Message,
};

pub mod state;
pub use state::{Signal, State, Status};

/// The playback engine.
pub struct Player<O: Output> {
    /// The position & status of playback.
    state: State,

    /// Where the audio actually goes.
    output: Arc<O>,

    /// A sender to the player itself, handed out to waiters.
    tx: mpsc::Sender<Message>,

    /// Incremented every time a song is loaded, to tell waiters apart.
    generation: u64,

    /// Watches the song that's currently loaded, if any.
    waiter: Option<waiter::Handle>,

    /// The last song which failed to load, and why.
    failure: Option<String>,
}

impl<O: Output> Player<O> {
    /// Creates the player, which will be idle until told to play.
    ///
    /// `tx` has to be the sending half of the queue later passed to [`Player::run`].
    pub fn new(output: Arc<O>, playlist: Playlist, looping: bool, tx: mpsc::Sender<Message>) -> Self {
        Self {
            state: State::new(playlist, looping),
            output,
            tx,
            generation: 0,
            waiter: None,
            failure: None,
        }
    }

    /// Applies a signal from the state machine to the output.
    fn apply(&mut self, signal: Option<Signal>) {
        let Some(signal) = signal else {
            return;
        };

        debug!("applying {signal:?}");
        match signal {
            Signal::Pause => self.output.pause(),
            Signal::Resume => self.output.resume(),
            Signal::Volume(delta) => {
                let volume = (self.output.volume() + delta).clamp(0.0, 1.0);
                self.output.set_volume(volume);
            }
            Signal::Stop => {
                self.waiter = None;
                self.output.stop();
            }
            Signal::SkipTo(index) => self.start(index),
        }
    }

    /// Loads the song at `index`, moving past songs which can't be loaded.
    ///
    /// The previous song, if any, is stopped first.
    ///
    /// If not a single song in the playlist loads, playback stops.
    fn start(&mut self, mut index: usize) {
        // Whatever is loaded has to be released before anything else is opened.
        if self.waiter.take().is_some() {
            self.output.stop();
        }

        for _ in 0..self.state.playlist.len() {
            let Some(song) = self.state.playlist.get(index) else {
                break;
            };

            match self.output.load(song) {
                Ok(()) => {
                    info!(index, title = %song.title, "now playing");
                    self.generation += 1;
                    self.waiter = Some(waiter::Handle::new(
                        Arc::clone(&self.output),
                        self.tx.clone(),
                        self.generation,
                    ));

                    return;
                }
                Err(error) => {
                    warn!("skipping {}: {error}", song.path.display());
                    self.failure = Some(error.to_string());

                    match self.state.finished() {
                        Some(Signal::SkipTo(next)) => index = next,
                        _ => {
                            self.output.stop();
                            return;
                        }
                    }
                }
            }
        }

        warn!("nothing in '{}' could be played", self.state.playlist.name);
        self.state.status = Status::Idle;
        self.output.stop();
    }

    /// The title of the song that's playing, if one is.
    fn playing(&self) -> Option<(usize, String)> {
        if !self.state.status.active() {
            return None;
        }

        self.state
            .current()
            .map(|song| (self.state.index, song.title.clone()))
    }

    /// Corrects a skip reported by the state machine, since loading
    /// may have moved further along than it expected.
    fn settle(&self, skipped: Skipped) -> Skipped {
        match skipped {
            Skipped::Playing { .. } => match self.playing() {
                Some((index, title)) => Skipped::Playing { index, title },
                None => Skipped::Halted(self.state.index),
            },
            skipped => skipped,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            playlist: self.state.playlist.clone(),
            index: self.state.index,
            status: self.state.status,
            volume: self.output.volume(),
            failure: self.failure.clone(),
        }
    }

    /// This is the main loop of the player.
    ///
    /// `rx` is used to communicate with it, and it only stops once
    /// it receives [`Message::Quit`].
    pub async fn run(mut self, mut rx: mpsc::Receiver<Message>) -> crate::Result<()> {
        while let Some(message) = rx.recv().await {
            match message {
                Message::Play(switch, reply) => {
                    let (mut play, signal) = self.state.play(switch);
                    self.apply(signal);

                    if matches!(play.started, Started::Playing(_)) {
                        play.started = match self.playing() {
                            Some((_, title)) => Started::Playing(title),
                            None => Started::Failed(self.failure.clone().unwrap_or_default()),
                        };
                    }

                    let _ = reply.send(play);
                }
                Message::Stop(reply) => {
                    let (stopped, signal) = self.state.stop();
                    self.apply(signal);
                    let _ = reply.send(stopped);
                }
                Message::Toggle(reply) => {
                    let (toggled, signal) = self.state.toggle();
                    self.apply(signal);
                    let _ = reply.send(toggled);
                }
                Message::Next(reply) => {
                    let (skipped, signal) = self.state.next();
                    self.apply(signal);
                    let _ = reply.send(self.settle(skipped));
                }
                Message::Previous(reply) => {
                    let (skipped, signal) = self.state.previous();
                    self.apply(signal);
                    let _ = reply.send(self.settle(skipped));
                }
                Message::ChangeVolume(delta, reply) => {
                    let volume = match self.state.volume(delta) {
                        Some(signal) => {
                            self.apply(Some(signal));
                            Volume::Set(self.output.volume())
                        }
                        None => Volume::Idle,
                    };

                    let _ = reply.send(volume);
                }
                Message::Append {
                    playlist,
                    songs,
                    reply,
                } => {
                    let _ = reply.send(self.state.append(playlist, songs));
                }
                Message::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                Message::Ended(generation) => {
                    if generation != self.generation {
                        debug!("ignoring stale end of song {generation}");
                        continue;
                    }

                    let signal = self.state.finished();
                    if signal == Some(Signal::Stop) {
                        info!("reached the end of '{}'", self.state.playlist.name);
                    }

                    self.apply(signal);
                }
                Message::Quit => break,
            }
        }

        self.waiter = None;
        self.output.stop();

        Ok(())
    }
}

/// A cheap, cloneable way to talk to a running [`Player`].
#[derive(Debug, Clone)]
pub struct Handle {
    tx: mpsc::Sender<Message>,
}

impl Handle {
    pub const fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Sends a request, and waits until the player has applied it.
    async fn request<T>(&self, message: impl FnOnce(Responder<T>) -> Message) -> crate::Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(message(tx)).await?;

        Ok(rx.await?)
    }

    pub async fn play(&self, switch: Option<Playlist>) -> crate::Result<Play> {
        self.request(|tx| Message::Play(switch, tx)).await
    }

    pub async fn stop(&self) -> crate::Result<Stopped> {
        self.request(Message::Stop).await
    }

    pub async fn toggle(&self) -> crate::Result<Toggled> {
        self.request(Message::Toggle).await
    }

    pub async fn next(&self) -> crate::Result<Skipped> {
        self.request(Message::Next).await
    }

    pub async fn previous(&self) -> crate::Result<Skipped> {
        self.request(Message::Previous).await
    }

    pub async fn volume(&self, delta: f32) -> crate::Result<Volume> {
        self.request(|tx| Message::ChangeVolume(delta, tx)).await
    }

    pub async fn append(&self, playlist: i64, songs: Vec<Song>) -> crate::Result<usize> {
        self.request(|reply| Message::Append {
            playlist,
            songs,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> crate::Result<Snapshot> {
        self.request(Message::Snapshot).await
    }

    /// Tells the player to stop for good.
    pub async fn quit(&self) -> crate::Result<()> {
        self.tx.send(Message::Quit).await?;
        Ok(())
    }
}
