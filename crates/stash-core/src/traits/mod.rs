//! Core traits defined in `stash-core` and implemented by other crates.

pub mod storage;

pub use storage::{BlobStore, ByteStream};
