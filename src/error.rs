use tokio::sync::{mpsc, oneshot};

use crate::{catalog, song, volume};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("unable to play song: {0}")]
    Song(#[from] song::Error),

    #[error("catalog failure: {0}")]
    Catalog(#[from] catalog::Error),

    #[error("unable to load/save the persistent volume: {0}")]
    PersistentVolume(#[from] volume::Error),

    #[error("apollo daemon is not active")]
    Unavailable(#[source] std::io::Error),

    #[error("apollo is already running with pid {0}")]
    AlreadyRunning(u32),

    #[error("daemon closed the connection without replying")]
    NoReply,

    #[error("audio playing error: {0}")]
    Rodio(#[from] rodio::StreamError),

    #[error("couldn't send internal message: {0}")]
    Send(#[from] mpsc::error::SendError<crate::Message>),

    #[error("player stopped before replying: {0}")]
    Receive(#[from] oneshot::error::RecvError),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory not found")]
    Directory,

    #[error("unable to set up logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("join error")]
    JoinError(#[from] tokio::task::JoinError),
}
