//! An in-process stand-in for the audio device, plus a few helpers around it.

use std::{
    collections::HashSet,
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{sync::mpsc, time};

use crate::{
    audio::Output,
    message::Snapshot,
    player::{self, Player},
    song::{self, Playlist, Song},
};

/// Records everything the player asks of it. Songs "play" until [`FakeOutput::finish`].
pub struct FakeOutput {
    loaded: Mutex<Vec<String>>,
    broken: HashSet<PathBuf>,
    paused: AtomicBool,
    empty: AtomicBool,
    volume: Mutex<f32>,
    stops: AtomicUsize,
}

impl FakeOutput {
    pub fn new() -> Arc<Self> {
        Self::broken(&[])
    }

    /// An output which refuses to load the songs with these titles.
    pub fn broken(titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            loaded: Mutex::new(Vec::new()),
            broken: titles.iter().map(|title| path(title)).collect(),
            paused: AtomicBool::new(false),
            empty: AtomicBool::new(true),
            volume: Mutex::new(1.0),
            stops: AtomicUsize::new(0),
        })
    }

    /// Makes the current song end by itself.
    pub fn finish(&self) {
        self.empty.store(true, Ordering::SeqCst);
    }

    /// Titles of every song loaded so far, in order.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn playing(&self) -> bool {
        !self.empty.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Output for FakeOutput {
    fn load(&self, song: &Song) -> song::Result<()> {
        if self.broken.contains(&song.path) {
            let error = io::Error::new(io::ErrorKind::InvalidData, "not audio");
            return Err((song.title.clone(), error).into());
        }

        self.loaded.lock().push(song.title.clone());
        self.paused.store(false, Ordering::SeqCst);
        self.empty.store(false, Ordering::SeqCst);

        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume;
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.empty.store(true, Ordering::SeqCst);
    }

    fn empty(&self) -> bool {
        self.empty.load(Ordering::SeqCst)
    }
}

/// The made up location of a song with this title.
pub fn path(title: &str) -> PathBuf {
    PathBuf::from(format!("/music/{title}.ogg"))
}

/// Songs with ids starting from 1, in order.
pub fn songs(titles: &[&str]) -> Vec<Song> {
    titles
        .iter()
        .zip(1..)
        .map(|(title, id)| Song {
            id,
            title: (*title).to_owned(),
            path: path(title),
        })
        .collect()
}

pub fn playlist(name: &str, titles: &[&str]) -> Playlist {
    Playlist::adhoc(name, songs(titles))
}

/// Spawns a player on top of `output`.
pub fn spawn(output: Arc<FakeOutput>, playlist: Playlist, looping: bool) -> player::Handle {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(Player::new(output, playlist, looping, tx.clone()).run(rx));

    player::Handle::new(tx)
}

/// Polls the player until `done` holds, panicking if it takes too long.
pub async fn until(handle: &player::Handle, done: impl Fn(&Snapshot) -> bool) -> Snapshot {
    time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = handle.snapshot().await.unwrap();
            if done(&snapshot) {
                return snapshot;
            }

            time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("player never reached the expected state")
}
