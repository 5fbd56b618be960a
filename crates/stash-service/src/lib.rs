//! # stash-service
//!
//! Business logic for Stash. The services here own every metadata
//! invariant: sibling-name uniqueness, cascading soft-delete and restore
//! over folder subtrees, the file lifecycle, and the share-token state
//! machine.
//!
//! Services follow constructor injection: stores, the blob store, and the
//! per-call [`StoreDeadline`] are handed in at construction time behind
//! `Arc`s.

pub mod deadline;
pub mod file;
pub mod folder;
pub mod naming;
pub mod share;
pub mod trash;

pub use deadline::StoreDeadline;
pub use file::{FileService, UploadService};
pub use folder::{FolderService, Subtree};
pub use share::{AccessService, LinkService, ShareService};
pub use trash::{CascadeOutcome, PurgeOutcome, TrashListing, TrashService};
