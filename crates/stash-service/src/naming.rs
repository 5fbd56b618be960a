//! Validation of tenant keys and user-visible names.

use stash_core::error::AppError;
use stash_core::result::AppResult;

/// Longest accepted name or tenant key, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Validate a tenant key.
///
/// Owner keys double as the top-level blob directory, so they follow the
/// same rules as names.
pub fn owner(raw: &str) -> AppResult<String> {
    check("Owner", raw)
}

/// Validate a folder name and return it trimmed.
pub fn folder_name(raw: &str) -> AppResult<String> {
    check("Folder name", raw)
}

/// Validate a file display name and return it trimmed.
pub fn file_name(raw: &str) -> AppResult<String> {
    check("File name", raw)
}

fn check(what: &str, raw: &str) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{what} cannot be empty")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{what} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if value == "." || value == ".." {
        return Err(AppError::validation(format!("{what} cannot be '{value}'")));
    }
    if value.contains(['/', '\\']) || value.chars().any(char::is_control) {
        return Err(AppError::validation(format!(
            "{what} contains forbidden characters: '{value}'"
        )));
    }
    Ok(value.to_string())
}
