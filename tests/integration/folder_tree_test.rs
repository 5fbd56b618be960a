//! Integration tests for the folder hierarchy and its trash cascades.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use stash_core::error::ErrorKind;
use stash_core::types::{FolderId, ParentRef};
use stash_database::memory::MemoryFolderStore;
use stash_service::folder::CreateFolderRequest;
use stash_service::{FolderService, StoreDeadline};

use helpers::{FailingDirectories, OWNER, TestApp};

#[tokio::test]
async fn test_duplicate_name_until_original_is_trashed() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;

    let err = app
        .folders
        .create(CreateFolderRequest {
            owner: OWNER.to_string(),
            name: "A".to_string(),
            parent: ParentRef::Root,
            description: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateName);

    app.folders.soft_delete(a.id).await.unwrap();
    let again = app.folder("A", ParentRef::Root).await;
    assert_ne!(again.id, a.id);
}

#[tokio::test]
async fn test_same_name_allowed_under_different_parents() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Root).await;
    app.folder("docs", ParentRef::Folder(a.id)).await;
    app.folder("docs", ParentRef::Folder(b.id)).await;
}

#[tokio::test]
async fn test_trashed_subtree_matches_deleted_listing() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    let c = app.folder("C", ParentRef::Folder(b.id)).await;
    let d = app.folder("D", ParentRef::Folder(a.id)).await;
    let other = app.folder("Other", ParentRef::Root).await;

    let subtree = app.folders.soft_delete_subtree(a.id).await.unwrap();
    assert_eq!(subtree.descendants.len(), 3);

    let deleted: HashSet<FolderId> = app
        .folders
        .list_deleted(OWNER)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    let expected: HashSet<FolderId> = [a.id, b.id, c.id, d.id].into_iter().collect();
    assert_eq!(deleted, expected);

    let other = app.folders.get(other.id).await.unwrap();
    assert!(!other.is_trashed());
}

#[tokio::test]
async fn test_soft_delete_then_restore_round_trips() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    app.folder("C", ParentRef::Folder(b.id)).await;

    let before = app.folders.subtree(a.id).await.unwrap();
    app.folders.soft_delete(a.id).await.unwrap();
    let restored = app.folders.restore_subtree(a.id).await.unwrap();

    assert!(!restored.root.is_trashed());
    assert_eq!(restored.descendants, before.descendants);
    assert!(app.folders.list_deleted(OWNER).await.unwrap().is_empty());
    for id in before.folder_ids() {
        assert!(!app.folders.get(id).await.unwrap().is_trashed());
    }
}

#[tokio::test]
async fn test_restore_blocked_by_new_sibling_with_same_name() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    app.folders.soft_delete(a.id).await.unwrap();
    app.folder("A", ParentRef::Root).await;

    let err = app.folders.restore(a.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateName);
    assert!(app.folders.get(a.id).await.unwrap().is_trashed());
}

#[tokio::test]
async fn test_child_cannot_be_restored_before_parent() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    app.folders.soft_delete(a.id).await.unwrap();

    let err = app.folders.restore(b.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_permanent_delete_removes_subtree_but_not_files() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;
    let b = app.folder("B", ParentRef::Folder(a.id)).await;
    app.folder("C", ParentRef::Folder(b.id)).await;
    let file = app.upload("notes.txt", ParentRef::Folder(b.id), "hello").await;

    let removed = app.folders.permanent_delete(a.id).await.unwrap();
    assert_eq!(removed, 3);

    let err = app.folders.get(a.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let orphan = app.files.get(file.id).await.unwrap();
    assert_eq!(orphan.folder_id, Some(b.id));
}

#[tokio::test]
async fn test_failed_directory_creation_leaves_no_record() {
    let folders = FolderService::new(
        Arc::new(MemoryFolderStore::new()),
        Arc::new(FailingDirectories::default()),
        StoreDeadline::default(),
    );

    let err = folders
        .create(CreateFolderRequest {
            owner: OWNER.to_string(),
            name: "A".to_string(),
            parent: ParentRef::Root,
            description: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(folders.list(OWNER, ParentRef::Root).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tenants_do_not_see_each_other() {
    let app = TestApp::new();
    let a = app.folder("A", ParentRef::Root).await;

    assert!(app.folders.list("u2", ParentRef::Root).await.unwrap().is_empty());

    let err = app
        .folders
        .create(CreateFolderRequest {
            owner: "u2".to_string(),
            name: "Inside".to_string(),
            parent: ParentRef::Folder(a.id),
            description: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_restore_returns_exactly_the_trashed_set() {
    let app = TestApp::new();
    let p = app.folder("P", ParentRef::Root).await;
    let kept = app.folder("Kept", ParentRef::Folder(p.id)).await;
    let gone = app.folder("Gone", ParentRef::Folder(p.id)).await;
    app.folder("Deep", ParentRef::Folder(kept.id)).await;

    app.folders.soft_delete(gone.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;

    let active_before: HashSet<FolderId> = active_ids(&app, p.id).await;
    app.folders.soft_delete(p.id).await.unwrap();
    app.folders.restore(p.id).await.unwrap();
    let active_after: HashSet<FolderId> = active_ids(&app, p.id).await;

    assert_eq!(active_before, active_after);
    assert!(!active_after.contains(&gone.id));
}

#[tokio::test]
async fn test_reused_name_inside_trashed_subtree_does_not_block_restore() {
    let app = TestApp::new();
    let p = app.folder("P", ParentRef::Root).await;
    let old_b = app.folder("B", ParentRef::Folder(p.id)).await;
    app.folders.soft_delete(old_b.id).await.unwrap();
    let new_b = app.folder("B", ParentRef::Folder(p.id)).await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    app.folders.soft_delete(p.id).await.unwrap();

    app.folders.restore(p.id).await.unwrap();

    let children = app.folders.list(OWNER, ParentRef::Folder(p.id)).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, new_b.id);
    assert!(app.folders.get(old_b.id).await.unwrap().is_trashed());
}

async fn active_ids(app: &TestApp, root: FolderId) -> HashSet<FolderId> {
    let subtree = app.folders.subtree(root).await.unwrap();
    let mut active = HashSet::new();
    for id in subtree.folder_ids() {
        if !app.folders.get(id).await.unwrap().is_trashed() {
            active.insert(id);
        }
    }
    active
}
