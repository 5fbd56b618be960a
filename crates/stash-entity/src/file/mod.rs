//! File domain entities.

pub mod model;
pub mod query;

pub use model::{CreateFile, File, FilePatch};
pub use query::FileQuery;
