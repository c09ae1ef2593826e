//! Accepts client connections and feeds their requests to the [`Dispatcher`].

use std::io::ErrorKind;

use tokio::{
    io::BufReader,
    net::{TcpListener, TcpStream},
    select, task,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    dispatch::Dispatcher,
    protocol::{self, Request, Response},
};

/// Serves a single connection until the client hangs up.
///
/// A [`Request::Kill`] is answered first, and only then is `shutdown`
/// cancelled, so the client always gets its acknowledgement.
async fn connection(
    stream: TcpStream,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let request = match protocol::read::<Request, _>(&mut reader).await {
            Ok(Some(request)) => request,
            Ok(None) => break,
            Err(crate::Error::Json(error)) => {
                let response = Response::error(format!("malformed request: {error}"));
                protocol::write(&mut writer, &response).await?;
                continue;
            }
            // The offending line has been consumed, so the next one can still be read.
            Err(crate::Error::Io(error)) if error.kind() == ErrorKind::InvalidData => {
                let response = Response::error(format!("malformed request: {error}"));
                protocol::write(&mut writer, &response).await?;
                continue;
            }
            Err(error) => return Err(error),
        };

        let kill = matches!(request, Request::Kill);
        let response = dispatcher.dispatch(request).await;
        protocol::write(&mut writer, &response).await?;

        if kill {
            info!("kill requested");
            shutdown.cancel();
            break;
        }
    }

    Ok(())
}

/// Accepts connections until `shutdown` is cancelled.
pub async fn listen(
    listener: TcpListener,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
) -> crate::Result<()> {
    info!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, address) = select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!("failed to accept connection: {error}");
                    continue;
                }
            },
        };

        debug!("connection from {address}");
        let dispatcher = dispatcher.clone();
        let shutdown = shutdown.clone();
        task::spawn(async move {
            if let Err(error) = connection(stream, dispatcher, shutdown).await {
                warn!("connection from {address} failed: {error}");
            }
        });
    }

    Ok(())
}
