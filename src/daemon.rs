//! Responsible for the basic initialization & shutdown of the daemon.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use rodio::Sink;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{error, info, warn};

use crate::{
    audio,
    catalog::Catalog,
    config::Config,
    dispatch::Dispatcher,
    player::{self, Player},
    server,
    song::{self, Playlist},
    tasks::Tasks,
    volume::PersistentVolume,
};

/// The name of the ad-hoc playlist built from launch arguments.
const UNLISTED: &str = "Unlisted";

/// The name of the ad-hoc playlist holding the whole catalog.
const ALL_SONGS: &str = "All Songs";

/// Ensures only one daemon runs at a time, by holding a pid file.
///
/// The file is removed again when the lock is dropped.
#[derive(Debug)]
pub struct Lock {
    path: PathBuf,
}

impl Lock {
    /// Creates the pid file at `path`.
    ///
    /// If the file already exists and names a live process, this fails
    /// with [`crate::Error::AlreadyRunning`]. Files left behind by a daemon
    /// that died without cleaning up are replaced.
    pub fn acquire(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    write!(file, "{}", std::process::id())?;
                    return Ok(Self { path });
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    let contents = fs::read_to_string(&path)?;
                    if let Ok(pid) = contents.trim().parse::<u32>() {
                        if alive(pid) {
                            return Err(crate::Error::AlreadyRunning(pid));
                        }
                    }

                    warn!("removing stale pid file {}", path.display());
                    fs::remove_file(&path)?;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            warn!("couldn't remove pid file {}: {error}", self.path.display());
        }
    }
}

/// Whether a process with this pid exists.
#[cfg(target_os = "linux")]
fn alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };

    // SAFETY: Signal 0 only checks for existence & permissions, nothing is delivered.
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Without a portable way to check, any pid file is assumed to be live.
#[cfg(not(target_os = "linux"))]
const fn alive(_pid: u32) -> bool {
    true
}

/// Builds the playlist the daemon starts with.
///
/// Each target is either a file, a directory, or the title of a song
/// in the catalog. Without any usable targets, the whole catalog is used.
pub fn seed(targets: &[String], catalog: &Catalog) -> crate::Result<Playlist> {
    let mut songs = Vec::new();

    for target in targets {
        let path = Path::new(target);
        if path.exists() {
            match song::collect(path) {
                Ok(found) => songs.extend(found),
                Err(error) => warn!("ignoring {target}: {error}"),
            }
        } else if let Some(song) = catalog.song_titled(target)? {
            songs.push(song);
        } else {
            warn!("{target} is neither a file, a directory nor a known song");
        }
    }

    if songs.is_empty() {
        Ok(Playlist::adhoc(ALL_SONGS, catalog.songs()?))
    } else {
        Ok(Playlist::adhoc(UNLISTED, songs))
    }
}

/// Runs the daemon until it's killed, then shuts it down cleanly.
pub async fn run(targets: Vec<String>) -> crate::Result<()> {
    let config = Config::load().await?;
    let data = crate::data_dir()?;
    let lock = Lock::acquire(data.join("apollo.pid"))?;

    let catalog = Arc::new(Catalog::open(&data.join("apollo.db"))?);
    let playlist = seed(&targets, &catalog)?;
    info!(
        "starting with '{}', {} song(s)",
        playlist.name,
        playlist.len()
    );

    // The stream stays here, since it has to outlive every use of the sink.
    let stream = audio::open_stream()?;
    let sink = Arc::new(Sink::connect_new(stream.mixer()));
    sink.set_volume(PersistentVolume::load().await?.float());

    let listener = TcpListener::bind(&config.address).await?;

    let (tx, rx) = mpsc::channel(32);
    let handle = player::Handle::new(tx.clone());
    let mut tasks = Tasks::new();

    tasks.spawn(Player::new(Arc::clone(&sink), playlist, config.looping, tx).run(rx));

    let config = Arc::new(config);
    let dispatcher = Dispatcher::new(handle.clone(), catalog, Arc::clone(&config));
    tasks.spawn(server::listen(listener, dispatcher, tasks.token()));

    eprintln!("Apollo started on {}", config.address);
    let result = tasks.wait().await;
    if let Err(error) = &result {
        error!("daemon failed: {error}");
    }

    info!("shutting down");
    // The player is already gone if it's what failed.
    let _ = handle.quit().await;
    tasks.shutdown().await;

    PersistentVolume::save(sink.volume()).await?;
    config.save().await?;
    drop(lock);

    result
}
