//! The short-lived side of apollo, which sends one command and prints the reply.

use tokio::{io::BufReader, net::TcpStream};

use crate::protocol::{self, Request, Response};

/// Sends `request` to the daemon at `address` and waits for its response.
pub async fn send(address: &str, request: &Request) -> crate::Result<Response> {
    let stream = TcpStream::connect(address)
        .await
        .map_err(crate::Error::Unavailable)?;

    let (reader, mut writer) = stream.into_split();
    protocol::write(&mut writer, request).await?;

    let mut reader = BufReader::new(reader);
    protocol::read(&mut reader)
        .await?
        .ok_or(crate::Error::NoReply)
}
