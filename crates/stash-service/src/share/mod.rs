//! Share Manager: token issuance, resolution, revocation, and public
//! access.

pub mod access;
pub mod link;
pub mod service;

pub use access::{AccessService, SharedDownload};
pub use link::LinkService;
pub use service::ShareService;
