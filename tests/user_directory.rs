//! User Directory Integration Tests
//!
//! Tests for the account cap, case-insensitive usernames and persistence.

use tempfile::TempDir;
use vidshelf::{DirectoryError, UserDirectory, MAX_USERS};

fn open_directory(temp: &TempDir) -> UserDirectory {
    UserDirectory::open(temp.path().join("users.json")).unwrap()
}

#[tokio::test]
async fn test_fourth_user_is_rejected() {
    let temp = TempDir::new().unwrap();
    let directory = open_directory(&temp);

    for name in ["alice", "bob", "carol"] {
        directory.register(name, "pw").await.unwrap();
    }
    assert_eq!(directory.len().await, MAX_USERS);

    let result = directory.register("dave", "pw").await;
    assert!(matches!(
        result,
        Err(DirectoryError::CapacityExceeded { limit: 3 })
    ));
    assert_eq!(directory.len().await, 3);

    // The cap survives a reload
    let reopened = open_directory(&temp);
    assert_eq!(reopened.len().await, 3);
    assert!(reopened.register("dave", "pw").await.is_err());
}

#[tokio::test]
async fn test_usernames_are_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let directory = open_directory(&temp);

    directory.register("Bob", "pw").await.unwrap();
    let result = directory.register("bob", "other").await;

    assert!(matches!(result, Err(DirectoryError::DuplicateUsername(_))));
    assert_eq!(directory.len().await, 1);
}

#[tokio::test]
async fn test_authenticate_returns_canonical_username() {
    let temp = TempDir::new().unwrap();
    let directory = open_directory(&temp);

    let id = directory.register("Bob", "secret").await.unwrap();
    let (found, username) = directory.authenticate("BOB", "secret").await.unwrap();

    assert_eq!(found, id);
    assert_eq!(username, "Bob");
}

#[tokio::test]
async fn test_deleting_frees_a_slot() {
    let temp = TempDir::new().unwrap();
    let directory = open_directory(&temp);

    let ids = [
        directory.register("alice", "pw").await.unwrap(),
        directory.register("bob", "pw").await.unwrap(),
        directory.register("carol", "pw").await.unwrap(),
    ];

    directory.delete(&ids[1]).await.unwrap();
    directory.register("dave", "pw").await.unwrap();

    let names: Vec<String> = directory
        .list()
        .await
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["alice", "carol", "dave"]);
}

#[tokio::test]
async fn test_failed_write_keeps_directory_unchanged() {
    let temp = TempDir::new().unwrap();
    let directory = open_directory(&temp);
    directory.register("alice", "pw-a").await.unwrap();

    let path = temp.path().join("users.json");
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupied"), b"").unwrap();

    let result = directory.register("bob", "pw-b").await;
    assert!(matches!(result, Err(DirectoryError::Store(_))));
    assert_eq!(directory.len().await, 1);
    assert!(!directory.list().await.iter().any(|u| u.username == "bob"));
}
