//! # stash-database
//!
//! The Entity Store: persistence traits for files, folders, and shares,
//! with a PostgreSQL implementation (sqlx) for deployments and an
//! in-memory implementation for tests and embedded use.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{EntityStores, FileStore, FolderStore, ShareStore};
