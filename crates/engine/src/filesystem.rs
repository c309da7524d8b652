use crate::error::Result;
use crate::pattern::NameMatcher;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Recursive, single-threaded walk yielding files whose name matches.
///
/// Hidden entries and ignore files get no special treatment and siblings are
/// visited in name order. Directories are entered but never yielded.
/// Symlinked directories are not descended into; symlinked files are yielded
/// at their link path when the target is a regular file.
///
/// # Errors
/// Each traversal error (unreadable directory, permission denied) is yielded
/// as an `Err`; callers are expected to stop at the first one.
pub fn walk_matching<'a>(
    root: &Path,
    matcher: &'a NameMatcher,
) -> impl Iterator<Item = Result<PathBuf>> + use<'a> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    walker.filter_map(move |entry| match entry {
        Ok(entry) => {
            let is_file = match entry.file_type() {
                Some(ft) if ft.is_symlink() => entry.path().is_file(),
                Some(ft) => ft.is_file(),
                None => false,
            };
            (is_file && matcher.matches(entry.path())).then(|| Ok(entry.into_path()))
        }
        Err(e) => Some(Err(e.into())),
    })
}
