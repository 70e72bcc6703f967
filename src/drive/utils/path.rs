// Path helper utilities for local upload sources
use std::path::Path;

/// Extract the file name of a local path, if it has one.
pub fn basename(path: &Path) -> Option<String> {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
}
