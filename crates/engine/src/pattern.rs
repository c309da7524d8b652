// crates/engine/src/pattern.rs
use crate::error::{EngineError, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

pub const DEFAULT_EXTENSION: &str = "dll";

const WILDCARDS: &[char] = &['*', '?', '['];

/// Turns a user filter into the glob actually matched against file names.
///
/// - blank → `*.<ext>`
/// - bare name without the extension → `<name>.<ext>`
/// - anything wildcarded or already carrying the extension → unchanged
///
/// # Errors
///
/// Returns an error if `extension` is empty.
pub fn normalize_filter(filter: Option<&str>, extension: &str) -> Result<String> {
    let extension = extension.trim().trim_start_matches('.');
    if extension.is_empty() {
        return Err(EngineError::Config("Module extension must not be empty".into()));
    }

    let filter = filter.map(str::trim).unwrap_or_default();
    if filter.is_empty() {
        return Ok(format!("*.{extension}"));
    }
    if filter.contains(WILDCARDS) || has_extension(filter, extension) {
        return Ok(filter.to_owned());
    }
    Ok(format!("{filter}.{extension}"))
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}

/// Case-insensitive glob over bare file names.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    pattern: String,
    matcher: GlobMatcher,
}

impl NameMatcher {
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid glob.
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| EngineError::Pattern {
                pattern: pattern.to_owned(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Matches the final component of `path` only.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.is_match(name))
    }
}
