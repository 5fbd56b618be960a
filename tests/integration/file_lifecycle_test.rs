//! Integration tests for uploads, downloads, and the file lifecycle.

mod helpers;

use stash_core::config::StorageConfig;
use stash_core::error::ErrorKind;
use stash_core::types::ParentRef;
use stash_service::file::UpdateFileRequest;

use helpers::{OWNER, TestApp, content, read_all};

#[tokio::test]
async fn test_upload_list_and_download() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let file = app.upload("notes.txt", ParentRef::Folder(a.id), "hello").await;

    assert_eq!(file.display_name, "notes.txt");
    assert_eq!(file.mime_type, "text/plain");
    assert_eq!(file.size_bytes, 5);
    assert!(file.storage_name.starts_with("u1/"));
    assert!(file.storage_name.ends_with(".txt"));
    assert!(app.blobs.contains(&file.storage_name).await);

    let listed = app.files.list(OWNER, ParentRef::Folder(a.id)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(app.files.list(OWNER, ParentRef::Root).await.unwrap().is_empty());

    let (_, stream) = app.files.open_content(file.id).await.unwrap();
    assert_eq!(read_all(stream).await, "hello");
}

#[tokio::test]
async fn test_folder_only_soft_delete_leaves_files_active() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let file = app.upload("notes.txt", ParentRef::Folder(a.id), "hello").await;

    app.folders.soft_delete(a.id).await.unwrap();

    let file = app.files.get(file.id).await.unwrap();
    assert!(!file.is_trashed());
}

#[tokio::test]
async fn test_file_restore_waits_for_folder() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let file = app.upload("notes.txt", ParentRef::Folder(a.id), "hello").await;

    app.trash.trash_folder(a.id).await.unwrap();
    assert!(app.files.get(file.id).await.unwrap().is_trashed());

    let err = app.files.restore(file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    app.trash.restore_folder(a.id).await.unwrap();
    assert!(!app.files.get(file.id).await.unwrap().is_trashed());
}

#[tokio::test]
async fn test_upload_into_trashed_folder_is_rejected_and_blob_discarded() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    app.folders.soft_delete(a.id).await.unwrap();

    let err = app
        .uploads
        .ingest(OWNER, ParentRef::Folder(a.id), content("notes.txt", "hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = TestApp::with_storage(&StorageConfig {
        max_upload_size_bytes: 4,
        ..StorageConfig::default()
    });

    let err = app
        .uploads
        .ingest(OWNER, ParentRef::Root, content("notes.txt", "hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_move_and_rename() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;

    let moved = app
        .files
        .update_metadata(
            file.id,
            UpdateFileRequest {
                display_name: Some("todo.txt".to_string()),
                folder: Some(ParentRef::Folder(a.id)),
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.display_name, "todo.txt");
    assert_eq!(moved.folder_id, Some(a.id));
    assert_eq!(moved.storage_name, file.storage_name);
}

#[tokio::test]
async fn test_replace_swaps_content() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;

    let replaced = app
        .uploads
        .ingest_replacement(file.id, content("notes.txt", "goodbye!"))
        .await
        .unwrap();

    assert_eq!(replaced.size_bytes, 8);
    assert_ne!(replaced.storage_name, file.storage_name);
    assert!(!app.blobs.contains(&file.storage_name).await);
    assert_eq!(app.blobs.len().await, 1);

    let (_, stream) = app.files.open_content(file.id).await.unwrap();
    assert_eq!(read_all(stream).await, "goodbye!");
}

#[tokio::test]
async fn test_trashed_file_cannot_be_downloaded() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    app.files.soft_delete(file.id).await.unwrap();

    let err = app.files.open_content(file.id).await.err().unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_batch_upload_keeps_order() {
    let app = TestApp::new();
    let files = app
        .uploads
        .ingest_many(
            OWNER,
            ParentRef::Root,
            vec![content("a.txt", "a"), content("b.txt", "bb")],
        )
        .await
        .unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);
    assert_eq!(app.blobs.len().await, 2);
}
