#[cfg(test)]
mod server {
    use std::{sync::Arc, time::Duration};

    use tokio::{
        io::{AsyncWriteExt as _, BufReader},
        net::{TcpListener, TcpStream},
        time,
    };
    use tokio_util::sync::CancellationToken;

    use crate::{
        catalog::Catalog,
        client,
        config::Config,
        dispatch::Dispatcher,
        protocol::{self, Request, Response},
        server,
        tests::fake::{self, FakeOutput},
        Error,
    };

    #[tokio::test]
    async fn serves_until_killed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let player = fake::spawn(FakeOutput::new(), fake::playlist("abc", &["A"]), true);
        let catalog = Arc::new(Catalog::in_memory().unwrap());
        let dispatcher = Dispatcher::new(player, catalog, Arc::new(Config::default()));

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server::listen(listener, dispatcher, shutdown.clone()));

        let response = client::send(&address, &Request::Play { playlist: None })
            .await
            .unwrap();
        assert_eq!(response, Response::ok("Playing song: A"));

        let response = client::send(&address, &Request::Kill).await.unwrap();
        assert_eq!(response, Response::ok("Daemon killed"));

        time::timeout(Duration::from_secs(2), shutdown.cancelled())
            .await
            .unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_gets_a_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let player = fake::spawn(FakeOutput::new(), fake::playlist("abc", &["A"]), true);
        let catalog = Arc::new(Catalog::in_memory().unwrap());
        let dispatcher = Dispatcher::new(player, catalog, Arc::new(Config::default()));
        tokio::spawn(server::listen(listener, dispatcher, CancellationToken::new()));

        let stream = TcpStream::connect(address).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        writer.write_all(b"\xff\xfe\n").await.unwrap();
        let response: Response = protocol::read(&mut reader).await.unwrap().unwrap();
        assert!(!response.ok);
        assert!(response.reply.starts_with("malformed request"));

        // The connection is still usable afterwards.
        protocol::write(&mut writer, &Request::Toggle).await.unwrap();
        let response: Response = protocol::read(&mut reader).await.unwrap().unwrap();
        assert_eq!(response, Response::ok("No song playing..."));
    }

    #[tokio::test]
    async fn nobody_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let error = client::send(&address, &Request::Status).await.unwrap_err();
        assert!(matches!(error, Error::Unavailable(_)));
    }
}
