//! Integration tests for trash listing, restore, and purge.

mod helpers;

use std::time::Duration;

use stash_core::error::ErrorKind;
use stash_core::types::ParentRef;

use helpers::{OWNER, TestApp};

#[tokio::test]
async fn test_trash_folder_cascades_to_files() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    app.upload("one.txt", ParentRef::Folder(a.id), "1").await;
    app.upload("two.txt", ParentRef::Folder(b.id), "2").await;
    let outside = app.upload("three.txt", ParentRef::Root, "3").await;

    let outcome = app.trash.trash_folder(a.id).await.unwrap();
    assert_eq!(outcome.folders, 2);
    assert_eq!(outcome.files, 2);
    assert!(outcome.folder.is_trashed());

    let listing = app.trash.list(OWNER).await.unwrap();
    assert_eq!(listing.folders.len(), 2);
    assert_eq!(listing.files.len(), 2);
    assert!(!app.files.get(outside.id).await.unwrap().is_trashed());
}

#[tokio::test]
async fn test_restore_folder_brings_back_everything() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    app.upload("two.txt", ParentRef::Folder(b.id), "2").await;

    app.trash.trash_folder(a.id).await.unwrap();
    let outcome = app.trash.restore_folder(a.id).await.unwrap();
    assert_eq!(outcome.folders, 2);
    assert_eq!(outcome.files, 1);

    assert!(app.trash.list(OWNER).await.unwrap().is_empty());
    assert_eq!(app.files.list(OWNER, ParentRef::Folder(b.id)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_purge_folder_destroys_files_and_blobs() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    let one = app.upload("one.txt", ParentRef::Folder(a.id), "1").await;
    app.upload("two.txt", ParentRef::Folder(b.id), "2").await;
    let outside = app.upload("three.txt", ParentRef::Root, "3").await;
    app.shares.create(one.id, None).await.unwrap();

    app.trash.trash_folder(a.id).await.unwrap();
    let outcome = app.trash.purge_folder(a.id).await.unwrap();
    assert_eq!(outcome.folders, 2);
    assert_eq!(outcome.files, 2);

    assert!(app.trash.list(OWNER).await.unwrap().is_empty());
    assert_eq!(app.blobs.len().await, 1);
    assert!(app.blobs.contains(&outside.storage_name).await);
    assert!(app.shares.list_by_owner(OWNER).await.unwrap().is_empty());

    let err = app.files.get(one.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_purge_active_file_is_allowed() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;

    app.trash.purge_file(file.id).await.unwrap();

    assert!(app.blobs.is_empty().await);
    let err = app.files.get(file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_purged_folder_name_is_free_again() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    app.trash.purge_folder(a.id).await.unwrap();
    app.folder("A", ParentRef::Root).await;
}

#[tokio::test]
async fn test_restore_folder_keeps_files_trashed_on_their_own() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let earlier = app.upload("old.txt", ParentRef::Folder(a.id), "1").await;
    let later = app.upload("new.txt", ParentRef::Folder(a.id), "2").await;

    app.files.soft_delete(earlier.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let trashed = app.trash.trash_folder(a.id).await.unwrap();
    assert_eq!(trashed.files, 1);

    let restored = app.trash.restore_folder(a.id).await.unwrap();
    assert_eq!(restored.files, 1);
    assert!(app.files.get(earlier.id).await.unwrap().is_trashed());
    assert!(!app.files.get(later.id).await.unwrap().is_trashed());
}

#[tokio::test]
async fn test_trash_after_folder_only_soft_delete_shares_the_stamp() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let file = app.upload("one.txt", ParentRef::Folder(a.id), "1").await;

    app.folders.soft_delete(a.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    app.trash.trash_folder(a.id).await.unwrap();

    let folder = app.folders.get(a.id).await.unwrap();
    let trashed = app.files.get(file.id).await.unwrap();
    assert_eq!(trashed.deleted_at, folder.deleted_at);

    app.trash.restore_folder(a.id).await.unwrap();
    assert!(!app.files.get(file.id).await.unwrap().is_trashed());
}
