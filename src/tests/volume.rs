#[cfg(test)]
mod volume {
    use tokio::fs;

    use crate::volume::PersistentVolume;

    #[test]
    fn float_converts_percent() {
        let pv = PersistentVolume { inner: 75 };
        assert!((pv.float() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn float_bounds() {
        assert_eq!(PersistentVolume { inner: 0 }.float(), 0.0);
        assert_eq!(PersistentVolume { inner: 100 }.float(), 1.0);
    }

    #[tokio::test]
    async fn missing_file_is_created_at_full() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("volume.txt");

        let pv = PersistentVolume::load_from(&path).await.unwrap();
        assert_eq!(pv.inner, 100);
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "100");
    }

    #[tokio::test]
    async fn save_then_load() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("volume.txt");

        PersistentVolume::save_to(&path, 0.456).await.unwrap();
        assert_eq!(PersistentVolume::load_from(&path).await.unwrap().inner, 46);
    }

    #[tokio::test]
    async fn accepts_percent_sign() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("volume.txt");
        fs::write(&path, "30%\n").await.unwrap();

        assert_eq!(PersistentVolume::load_from(&path).await.unwrap().inner, 30);
    }

    #[tokio::test]
    async fn over_range_file_is_capped() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("volume.txt");
        fs::write(&path, "150").await.unwrap();

        let pv = PersistentVolume::load_from(&path).await.unwrap();
        assert_eq!(pv.float(), 1.0);
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("volume.txt");
        fs::write(&path, "loud").await.unwrap();

        assert!(PersistentVolume::load_from(&path).await.is_err());
    }
}
