//! A tiny background music daemon you talk to from the terminal.
pub mod error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use error::{Error, Result};
pub mod message;
pub use message::Message;

use crate::protocol::Request;
pub mod audio;
pub mod catalog;
pub mod client;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod logging;
pub mod player;
pub mod protocol;
pub mod server;
pub mod song;
pub mod tasks;
pub mod volume;

/// A tiny background music daemon you talk to from the terminal.
///
/// Run without a command to start the daemon.
#[derive(Parser, Clone)]
#[command(about, version)]
pub struct Args {
    /// Include debug logs in the daemon's log file.
    #[clap(long, short, global = true)]
    debug: bool,

    /// The command that was ran.
    /// This is [None] if no command was specified, which starts the daemon.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Defines all of the commands apollo can run.
#[derive(Subcommand, Clone, Debug, PartialEq)]
enum Commands {
    /// Starts the daemon, optionally with songs, directories or titles to play.
    Start { targets: Vec<String> },

    /// Starts playback, optionally switching to a named playlist.
    Play { playlist: Option<String> },

    /// Stops playback.
    Stop,

    /// Pauses or unpauses playback.
    Toggle,

    /// Skips to the next song.
    Next,

    /// Goes back to the previous song.
    #[clap(alias = "prev")]
    Previous,

    /// Changes the volume by a relative amount, like `0.1` or `-0.1`.
    #[clap(alias = "vol")]
    Volume {
        #[arg(allow_negative_numbers = true)]
        delta: f32,
    },

    /// Lists every song in the catalog.
    List,

    /// Shows the current playlist.
    Playlist,

    /// Lists the saved playlists.
    Playlists,

    /// Registers new songs from a directory, or the configured music directory.
    Sync { directory: Option<PathBuf> },

    /// Creates a playlist.
    Create { name: String },

    /// Deletes a playlist.
    Delete { name: String },

    /// Adds songs, by id, to the current playlist.
    Add {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Removes songs whose files no longer exist from the catalog.
    Clean,

    /// Shows what's playing.
    Status,

    /// Stops the daemon.
    Kill,
}

impl Commands {
    /// Converts the command into a request for the daemon.
    ///
    /// This is [None] for [`Commands::Start`], which is handled locally.
    fn request(self) -> Option<Request> {
        Some(match self {
            Self::Start { .. } => return None,
            Self::Play { playlist } => Request::Play { playlist },
            Self::Stop => Request::Stop,
            Self::Toggle => Request::Toggle,
            Self::Next => Request::Next,
            Self::Previous => Request::Previous,
            Self::Volume { delta } => Request::Volume { delta },
            Self::List => Request::List,
            Self::Playlist => Request::Playlist,
            Self::Playlists => Request::Playlists,
            Self::Sync { directory } => Request::Sync {
                // The daemon might not share our working directory.
                directory: directory.map(|x| std::path::absolute(&x).unwrap_or(x)),
            },
            Self::Create { name } => Request::Create { name },
            Self::Delete { name } => Request::Delete { name },
            Self::Add { ids } => Request::Add { ids },
            Self::Clean => Request::Clean,
            Self::Status => Request::Status,
            Self::Kill => Request::Kill,
        })
    }
}

/// Gets apollo's data directory, creating it if needed.
pub fn data_dir() -> crate::Result<PathBuf> {
    let dir = dirs::data_dir().ok_or(Error::Directory)?.join("apollo");
    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Gets apollo's config directory, creating it if needed.
pub fn config_dir() -> crate::Result<PathBuf> {
    let dir = dirs::config_dir().ok_or(Error::Directory)?.join("apollo");
    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Start { targets: vec![] });

    if let Commands::Start { targets } = command {
        let _guard = logging::init(args.debug)?;
        daemon::run(targets).await?;
        return Ok(());
    }

    let Some(request) = command.request() else {
        return Ok(());
    };

    let config = config::Config::load().await?;
    let response = client::send(&config.address, &request).await?;
    if response.ok {
        println!("apollo: {}", response.reply.trim_end());
        Ok(())
    } else {
        Err(eyre::eyre!("{}", response.reply))
    }
}
