//! # stash-entity
//!
//! Domain entity models for Stash. Every record struct in this crate
//! represents a row of one of the three collections (files, folders,
//! shares) and derives `sqlx::FromRow`. Alongside each record live the
//! payload used to create it, the patch used to mutate it, and the query
//! predicate used to select it.

pub mod file;
pub mod folder;
pub mod lifecycle;
pub mod share;

pub use lifecycle::LifecycleFilter;
