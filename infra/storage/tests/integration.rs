use scholar_storage::{Storage, StorageError};
use tempfile::TempDir;

#[tokio::test]
async fn test_path_traversal_blocked() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    assert!(storage.resolve("../etc/passwd").is_err());
    assert!(storage.resolve("foo/../../bar").is_err());
    assert!(storage.resolve("/etc/passwd").is_err());
}

#[tokio::test]
async fn test_write_read_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    let payload = br#"{"disciplinas":{}}"#;
    storage.write("nested/records.json", payload).await.unwrap();
    assert!(temp.path().join("nested").join("records.json").is_file());

    let data = storage.read("nested/records.json").await.unwrap();
    assert_eq!(data, payload);
}

#[tokio::test]
async fn test_write_replaces_previous_content_without_leftovers() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    storage.write("records.json", b"first version, much longer than the second").await.unwrap();
    storage.write("records.json", b"second").await.unwrap();

    assert_eq!(storage.read("records.json").await.unwrap(), b"second");

    let leftovers = std::fs::read_dir(temp.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().contains(".scholartmp."))
        .count();
    assert_eq!(leftovers, 0, "temporary files must not survive a successful write");
}

#[tokio::test]
async fn test_failed_swap_keeps_target_and_cleans_temp() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    let blocker = temp.path().join("records.json");
    std::fs::create_dir_all(blocker.join("inner")).unwrap();

    let err = storage.write("records.json", b"{}").await.expect_err("rename onto a directory");
    assert!(matches!(err, StorageError::Io { .. }), "unexpected error: {err:?}");
    assert!(blocker.is_dir());

    let leftovers = std::fs::read_dir(temp.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().contains(".scholartmp."))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_read_missing_returns_file_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

    let err = storage.read("missing.json").await.expect_err("expected error");
    match err {
        StorageError::FileNotFound { .. } => {},
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_without_create_requires_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent");

    let err = Storage::builder().root(&missing).create(false).connect().await.unwrap_err();
    assert!(matches!(err, StorageError::DirectoryNotFound { .. }));
}
