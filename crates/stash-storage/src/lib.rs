//! # stash-storage
//!
//! [`BlobStore`](stash_core::traits::BlobStore) implementations for Stash:
//! a local filesystem store rooted at the configured upload base path and
//! an in-memory store for tests.

pub mod path;
pub mod providers;

pub use providers::local::LocalBlobStore;
pub use providers::memory::MemoryBlobStore;
