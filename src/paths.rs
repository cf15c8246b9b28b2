//! Derived-path helpers. Pure path computation, no filesystem I/O.

use std::path::{Path, PathBuf};

/// Resolve a configured path against a root directory: absolute paths pass
/// through unchanged, relative paths are joined onto the root.
pub fn resolve_under_root(root: &Path, candidate: &Path) -> PathBuf {
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}
