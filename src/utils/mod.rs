//! Utility functions and helpers.

pub mod http;

use std::path::Path;

/// File name component of a path, for display and remote object names.
pub fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
