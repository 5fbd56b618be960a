//! Integration tests for share links and anonymous access.

mod helpers;

use chrono::{Duration, Utc};

use stash_core::error::ErrorKind;
use stash_core::types::ParentRef;

use helpers::{BASE_URL, OWNER, TestApp, read_all};

#[tokio::test]
async fn test_open_counts_downloads() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app.shares.create(file.id, None).await.unwrap();
    assert_eq!(share.download_count, 0);
    assert!(share.last_accessed_at.is_none());

    let first = app.access.open(&share.token).await.unwrap();
    assert_eq!(first.share.download_count, 1);
    assert_eq!(read_all(first.stream).await, "hello");

    let second = app.access.open(&share.token).await.unwrap();
    assert_eq!(second.share.download_count, 2);
    assert!(second.share.last_accessed_at >= first.share.last_accessed_at);
}

#[tokio::test]
async fn test_resolve_does_not_count() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app.shares.create(file.id, None).await.unwrap();

    let resolved = app.shares.resolve(&share.token).await.unwrap();
    assert_eq!(resolved.id, share.id);
    assert_eq!(resolved.download_count, 0);
}

#[tokio::test]
async fn test_past_expiry_resolves_expired() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app
        .shares
        .create(file.id, Some(Utc::now() - Duration::hours(1)))
        .await
        .unwrap();

    let err = app.shares.resolve(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);
}

#[tokio::test]
async fn test_revoked_share_stays_revoked() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app.shares.create(file.id, None).await.unwrap();
    app.shares.create(file.id, None).await.unwrap();

    assert_eq!(app.shares.revoke(file.id).await.unwrap(), 2);
    assert_eq!(app.shares.revoke(file.id).await.unwrap(), 0);

    let err = app.access.open(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Revoked);
}

#[tokio::test]
async fn test_share_of_trashed_file_is_invalid_state() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app.shares.create(file.id, None).await.unwrap();
    app.files.soft_delete(file.id).await.unwrap();

    let err = app.shares.resolve(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    app.files.restore(file.id).await.unwrap();
    assert!(app.shares.resolve(&share.token).await.is_ok());
}

#[tokio::test]
async fn test_purge_removes_shares() {
    let app = TestApp::new();
    let file = app.upload("notes.txt", ParentRef::Root, "hello").await;
    let share = app.shares.create(file.id, None).await.unwrap();

    app.trash.purge_file(file.id).await.unwrap();

    let err = app.shares.resolve(&share.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.shares.list_by_file(file.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_links_and_owner_listing() {
    let app = TestApp::new();
    let a = app.upload("a.txt", ParentRef::Root, "a").await;
    let b = app.upload("b.txt", ParentRef::Root, "b").await;
    let share = app.shares.create(a.id, None).await.unwrap();
    app.shares.create(b.id, None).await.unwrap();

    let link = app.shares.links().build_link(&share);
    assert_eq!(link.url, format!("{BASE_URL}/share/{}", share.token));
    assert_eq!(link.token, share.token);
    assert_eq!(link.file_id, a.id);

    assert_eq!(app.shares.list_by_owner(OWNER).await.unwrap().len(), 2);
    assert!(app.shares.list_by_owner("u2").await.unwrap().is_empty());
}
