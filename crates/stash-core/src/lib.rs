//! # stash-core
//!
//! Core crate for Stash. Contains configuration schemas, typed
//! identifiers, the blob store collaborator trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Stash crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
