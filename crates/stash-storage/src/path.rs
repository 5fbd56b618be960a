//! Blob path validation.

use std::path::{Component, Path};

use stash_core::error::AppError;
use stash_core::result::AppResult;

/// Normalize a caller-supplied blob path to `a/b/c` form.
///
/// Paths must be relative to the store root. Absolute paths, parent
/// (`..`) components, and empty paths are rejected with a validation error.
pub fn normalize(path: &str) -> AppResult<String> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') || Path::new(&unified).is_absolute() {
        return Err(AppError::validation(format!(
            "Blob path must be relative: '{path}'"
        )));
    }

    let mut parts = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => {
                    return Err(AppError::validation(format!(
                        "Blob path is not valid UTF-8: '{path}'"
                    )));
                }
            },
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::validation(format!(
                    "Blob path escapes the store root: '{path}'"
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(AppError::validation("Blob path must not be empty"));
    }
    Ok(parts.join("/"))
}
