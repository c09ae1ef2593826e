//! The audio output, which plays one song at a time.

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::song::{self, Song};

pub mod waiter;

/// Something that can play a single song at a time.
///
/// The [`crate::player::Player`] is the only writer, so implementations
/// only need to be internally consistent, not transactional.
pub trait Output: Send + Sync + 'static {
    /// Drops whatever is playing and starts `song` from the beginning.
    fn load(&self, song: &Song) -> song::Result<()>;

    /// Pauses playback, keeping the current position.
    fn pause(&self);

    /// Resumes playback from where it was paused.
    fn resume(&self);

    /// The current volume, from 0 to 1.
    fn volume(&self) -> f32;

    /// Sets the volume, which should already be clamped.
    fn set_volume(&self, volume: f32);

    /// Drops whatever is playing, releasing the decoder.
    fn stop(&self);

    /// Whether there's nothing left to play.
    fn empty(&self) -> bool;
}

impl Output for Sink {
    fn load(&self, song: &Song) -> song::Result<()> {
        // Decode first, so that a broken file doesn't interrupt anything.
        let decoded = song.decode()?;

        self.clear();
        self.append(decoded);
        self.play();

        Ok(())
    }

    fn pause(&self) {
        Self::pause(self);
    }

    fn resume(&self) {
        self.play();
    }

    fn volume(&self) -> f32 {
        Self::volume(self)
    }

    fn set_volume(&self, volume: f32) {
        Self::set_volume(self, volume);
    }

    fn stop(&self) {
        self.clear();
    }

    fn empty(&self) -> bool {
        Self::empty(self)
    }
}

/// Opens the default output device.
///
/// The returned [`OutputStream`] has to be kept alive for as long as
/// anything should be audible.
pub fn open_stream() -> crate::Result<OutputStream> {
    let mut stream = OutputStreamBuilder::open_default_stream()?;
    stream.log_on_drop(false);

    Ok(stream)
}
