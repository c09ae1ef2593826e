//! Task management.
//!
//! Keeps track of the daemon's long running tasks, and decides
//! when it's time for all of them to stop.

use futures_util::TryFutureExt;
use std::future::Future;
use tokio::{select, signal, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Handles all of the processes within the daemon.
/// This entails spawning tasks, noticing when one fails, and shutting them all down.
pub struct Tasks {
    /// The [`JoinSet`], which contains all of the task handles.
    set: JoinSet<crate::Result<()>>,

    /// Cancelled once the daemon should shut down, for whatever reason.
    shutdown: CancellationToken,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Tasks {
    /// Creates a new task manager.
    pub fn new() -> Self {
        Self {
            set: JoinSet::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Gets a copy of the shutdown token, for tasks which should be able to end the daemon.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Processes a task, and adds it to the internal [`JoinSet`].
    pub fn spawn<E: Into<crate::Error> + Send + Sync + 'static>(
        &mut self,
        future: impl Future<Output = Result<(), E>> + Send + 'static,
    ) {
        self.set.spawn(future.map_err(Into::into));
    }

    /// Waits until the daemon should stop.
    ///
    /// That's either when the shutdown token is cancelled, when the process
    /// receives Ctrl-C or `SIGTERM`, or when one of the tasks finishes,
    /// in which case its error (if any) is returned.
    pub async fn wait(&mut self) -> crate::Result<()> {
        let result = select! {
            () = self.shutdown.cancelled() => Ok(()),
            result = interrupted() => result,
            Some(result) = self.set.join_next() => match result {
                Ok(res) => res,
                Err(e) if !e.is_cancelled() => Err(crate::Error::JoinError(e)),
                Err(_) => Ok(()),
            }
        };

        self.shutdown.cancel();
        result
    }

    /// Aborts whatever is still running, and waits for it to wind down.
    pub async fn shutdown(mut self) {
        self.set.shutdown().await;
    }
}

/// Resolves once the process is asked to terminate.
async fn interrupted() -> crate::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        select! {
            result = signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    info!("received shutdown signal");
    Ok(())
}
