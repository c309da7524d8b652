// crates/engine/src/paths.rs
//! Scan root resolution and display-path relativization.

use crate::error::{EngineError, Result};
use std::path::{Path, PathBuf, is_separator};

/// Resolves `path` to an absolute, normalized directory.
///
/// # Errors
///
/// Returns an error if:
/// - The path contains null bytes
/// - The path cannot be canonicalized (doesn't exist, permission denied, etc.)
/// - The path is not a directory
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    if path.to_string_lossy().contains('\0') {
        return Err(EngineError::Config("Path contains null bytes".into()));
    }

    let canonical = path.canonicalize().map_err(|source| EngineError::Root {
        path: path.to_path_buf(),
        source,
    })?;

    if !canonical.is_dir() {
        return Err(EngineError::NotADirectory(canonical));
    }
    Ok(canonical)
}

/// Path of `path` relative to `root` for display.
///
/// The root prefix is matched case-insensitively and any leading separators
/// left over are trimmed. Paths outside `root` keep their full text.
#[must_use]
pub fn relative_display(path: &Path, root: &Path) -> String {
    let full = path.to_string_lossy();
    let root = root.to_string_lossy();
    strip_prefix_ignore_case(&full, &root)
        .unwrap_or(&*full)
        .trim_start_matches(is_separator)
        .to_owned()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = s.chars();
    for expected in prefix.chars() {
        let actual = rest.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(rest.as_str())
}
