pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Kind {
    #[error("unable to decode: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("invalid name")]
    InvalidName,

    #[error("unable to open file: {0}")]
    File(#[from] std::io::Error),
}

/// Failure to turn a song into something playable, optionally
/// tagged with the title of the song that caused it.
#[derive(Debug, thiserror::Error)]
#[error("{kind}{}", self.track.as_ref().map_or(String::new(), |t| format!(" (song: {t:?})")))]
pub struct Error {
    pub track: Option<String>,
    pub kind: Kind,
}

impl<T, E> From<(T, E)> for Error
where
    T: Into<String>,
    Kind: From<E>,
{
    fn from((track, err): (T, E)) -> Self {
        Self {
            track: Some(track.into()),
            kind: Kind::from(err),
        }
    }
}

impl<E> From<E> for Error
where
    Kind: From<E>,
{
    fn from(err: E) -> Self {
        Self {
            track: None,
            kind: Kind::from(err),
        }
    }
}

pub trait WithTrackContext<T> {
    fn track(self, name: impl Into<String>) -> Result<T>;
}

impl<T, E> WithTrackContext<T> for std::result::Result<T, E>
where
    (String, E): Into<Error>,
    E: Into<Kind>,
{
    fn track(self, name: impl Into<String>) -> std::result::Result<T, Error> {
        self.map_err(|e| (name.into(), e.into()).into())
    }
}
