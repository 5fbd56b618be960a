//! Share domain entities.

pub mod link;
pub mod model;

pub use link::ShareLink;
pub use model::{CreateShare, Share, ShareQuery, ShareState};
