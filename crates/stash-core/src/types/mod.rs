//! Core type definitions used across the Stash workspace.

pub mod id;
pub mod parent;

pub use id::*;
pub use parent::{ParentRef, ROOT_SENTINEL};
