//! The control protocol between client invocations & the daemon.
//!
//! Each message is a single line of JSON, and every request
//! gets exactly one response.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};

/// A command sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    Play { playlist: Option<String> },
    Stop,
    Toggle,
    Next,
    Previous,
    Volume { delta: f32 },
    List,
    Playlist,
    Playlists,
    Sync { directory: Option<PathBuf> },
    Create { name: String },
    Delete { name: String },
    Add { ids: Vec<i64> },
    Clean,
    Status,
    Kill,
}

/// The daemon's answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded, no-ops included.
    pub ok: bool,

    /// Human readable text to show the user.
    pub reply: String,
}

impl Response {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            ok: true,
            reply: reply.into(),
        }
    }

    pub fn error(reply: impl Into<String>) -> Self {
        Self {
            ok: false,
            reply: reply.into(),
        }
    }
}

impl From<crate::Result<String>> for Response {
    fn from(result: crate::Result<String>) -> Self {
        match result {
            Ok(reply) => Self::ok(reply),
            Err(error) => Self::error(error.to_string()),
        }
    }
}

/// Reads a single message, returning [`None`] once the other side hangs up.
pub async fn read<T, R>(reader: &mut R) -> crate::Result<Option<T>>
where
    T: DeserializeOwned,
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(line.trim_end())?))
}

/// Writes a single message, followed by a newline.
pub async fn write<T, W>(writer: &mut W, message: &T) -> crate::Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');

    writer.write_all(&line).await?;
    writer.flush().await?;

    Ok(())
}
