use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::{self, JoinHandle},
    time,
};

use super::Output;
use crate::Message;

/// How often the output is checked for the end of a song.
const INTERVAL: Duration = Duration::from_millis(8);

/// Watches a single song, and reports to the player once it's done.
///
/// Dropping the handle cancels the watch, which is what happens
/// whenever the song is pre-empted by a skip or a stop.
pub struct Handle {
    task: JoinHandle<()>,
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Handle {
    /// Starts watching the song which was just loaded into `output`.
    ///
    /// `generation` identifies the song, so the player can discard
    /// reports which arrive after it has already moved on.
    pub fn new<O: Output>(output: Arc<O>, tx: mpsc::Sender<Message>, generation: u64) -> Self {
        Self {
            task: task::spawn(Self::waiter(output, tx, generation)),
        }
    }

    async fn waiter<O: Output>(output: Arc<O>, tx: mpsc::Sender<Message>, generation: u64) {
        while !output.empty() {
            time::sleep(INTERVAL).await;
        }

        // The player is gone if this fails, so there's nobody left to tell.
        let _ = tx.send(Message::Ended(generation)).await;
    }
}
