#[cfg(test)]
mod player {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use crate::{
        message::{Skipped, Started, Stopped, Toggled, Volume},
        player::{self, Player, Status},
        tests::fake::{self, FakeOutput},
        Message,
    };

    const ABC: [&str; 3] = ["A", "B", "C"];

    #[tokio::test]
    async fn concurrent_plays_load_once() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);

        let (first, second) = tokio::join!(handle.play(None), handle.play(None));
        let started = [first.unwrap().started, second.unwrap().started];

        assert!(started.contains(&Started::Playing("A".into())));
        assert!(started.contains(&Started::Already));
        assert_eq!(output.loaded(), vec!["A"]);
    }

    #[tokio::test]
    async fn natural_end_advances() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);
        handle.play(None).await.unwrap();

        output.finish();
        let snapshot = fake::until(&handle, |x| x.index == 1).await;

        assert_eq!(snapshot.status, Status::Playing);
        assert_eq!(output.loaded(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn natural_end_halts_without_loop() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("one", &["A"]), false);
        handle.play(None).await.unwrap();

        output.finish();
        let snapshot = fake::until(&handle, |x| x.status == Status::Idle).await;

        assert_eq!(snapshot.index, 0);
        assert_eq!(output.loaded(), vec!["A"]);
        assert!(!output.playing());
    }

    #[tokio::test]
    async fn broken_song_is_skipped() {
        let output = FakeOutput::broken(&["B"]);
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);
        handle.play(None).await.unwrap();

        let skipped = handle.next().await.unwrap();
        assert_eq!(
            skipped,
            Skipped::Playing {
                index: 2,
                title: "C".into()
            }
        );

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.status, Status::Playing);
        assert!(snapshot.failure.unwrap().contains("not audio"));
        assert_eq!(output.loaded(), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn broken_first_song() {
        let output = FakeOutput::broken(&["A"]);
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), false);

        let play = handle.play(None).await.unwrap();
        assert_eq!(play.started, Started::Playing("B".into()));
        assert_eq!(handle.snapshot().await.unwrap().index, 1);
    }

    #[tokio::test]
    async fn nothing_playable() {
        let output = FakeOutput::broken(&ABC);
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);

        let play = handle.play(None).await.unwrap();
        assert!(matches!(play.started, Started::Failed(_)));

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.status, Status::Idle);
        assert!(output.loaded().is_empty());
    }

    #[tokio::test]
    async fn stop_releases_output() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);
        handle.play(None).await.unwrap();
        handle.next().await.unwrap();

        assert_eq!(handle.stop().await.unwrap(), Stopped::At(1));
        assert!(!output.playing());
        assert_eq!(handle.stop().await.unwrap(), Stopped::Idle);

        // The position survives, so playing again picks up where it stopped.
        let play = handle.play(None).await.unwrap();
        assert_eq!(play.started, Started::Playing("B".into()));
    }

    #[tokio::test]
    async fn toggle_pauses_output() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);
        assert_eq!(handle.toggle().await.unwrap(), Toggled::Idle);

        handle.play(None).await.unwrap();
        assert_eq!(handle.toggle().await.unwrap(), Toggled::Paused);
        assert!(output.paused());
        assert_eq!(handle.toggle().await.unwrap(), Toggled::Resumed);
        assert!(!output.paused());
    }

    #[tokio::test]
    async fn volume_is_clamped() {
        let output = FakeOutput::new();
        let handle = fake::spawn(Arc::clone(&output), fake::playlist("abc", &ABC), true);
        assert_eq!(handle.volume(0.5).await.unwrap(), Volume::Idle);

        handle.play(None).await.unwrap();
        assert_eq!(handle.volume(0.5).await.unwrap(), Volume::Set(1.0));
        assert_eq!(handle.volume(-2.0).await.unwrap(), Volume::Set(0.0));
    }

    #[tokio::test]
    async fn stale_end_is_ignored() {
        let output = FakeOutput::new();
        let (tx, rx) = mpsc::channel(32);
        let player = Player::new(
            Arc::clone(&output),
            fake::playlist("abc", &ABC),
            true,
            tx.clone(),
        );
        tokio::spawn(player.run(rx));
        let handle = player::Handle::new(tx.clone());

        handle.play(None).await.unwrap();
        handle.next().await.unwrap();

        // Reports the end of "A", which was replaced by "B" already.
        tx.send(Message::Ended(1)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.index, 1);
        assert_eq!(output.loaded(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn switching_releases_previous_song() {
        let output = FakeOutput::new();
        let (tx, rx) = mpsc::channel(32);
        let player = Player::new(
            Arc::clone(&output),
            fake::playlist("abc", &ABC),
            true,
            tx.clone(),
        );
        tokio::spawn(player.run(rx));
        let handle = player::Handle::new(tx.clone());

        handle.play(None).await.unwrap();
        handle.next().await.unwrap();
        let stops = output.stops();

        let play = handle
            .play(Some(fake::playlist("xy", &["X", "Y"])))
            .await
            .unwrap();
        assert!(play.switched);
        assert_eq!(play.started, Started::Playing("X".into()));
        assert_eq!(output.stops(), stops + 1);
        assert_eq!(output.loaded(), vec!["A", "B", "X"]);

        // "B" was the second song loaded, and its end mustn't move "X" along.
        tx.send(Message::Ended(2)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.playlist.name, "xy");
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.status, Status::Playing);
        assert_eq!(output.loaded(), vec!["A", "B", "X"]);
    }

    #[tokio::test]
    async fn quit_stops_output() {
        let output = FakeOutput::new();
        let (tx, rx) = mpsc::channel(32);
        let player = Player::new(
            Arc::clone(&output),
            fake::playlist("abc", &ABC),
            true,
            tx.clone(),
        );
        let task = tokio::spawn(player.run(rx));
        let handle = player::Handle::new(tx);

        handle.play(None).await.unwrap();
        handle.quit().await.unwrap();
        task.await.unwrap().unwrap();

        assert!(!output.playing());
        assert!(handle.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn append_extends_selected_playlist() {
        let output = FakeOutput::new();
        let mut playlist = fake::playlist("saved", &["A"]);
        playlist.id = 3;
        let handle = fake::spawn(output, playlist, true);

        assert_eq!(handle.append(3, fake::songs(&["B"])).await.unwrap(), 1);
        assert_eq!(handle.append(9, fake::songs(&["C"])).await.unwrap(), 0);
        assert_eq!(handle.snapshot().await.unwrap().playlist.len(), 2);
    }
}
