// crates/engine/src/lib.rs
use std::path::PathBuf;

pub mod config;
pub mod error;
pub mod filesystem;
pub mod metadata;
pub mod options;
pub mod paths;
pub mod pattern;
pub mod record;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixture;

use crate::config::Config;
use crate::error::Result;
use crate::metadata::{ClrReader, IdentityReader};
use crate::pattern::{NameMatcher, normalize_filter};
use crate::record::FileMetadataRecord;

/// Outcome of one scan: a record for every file that matched the filter.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Canonical scan root.
    pub root: PathBuf,
    /// Effective glob after normalization.
    pub pattern: String,
    /// One entry per matched file, in walk order, failures included.
    pub records: Vec<FileMetadataRecord>,
}

impl RunResult {
    /// Number of files the scanner yielded.
    pub fn scanned(&self) -> usize {
        self.records.len()
    }

    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| r.is_error).count()
    }
}

/// Scan `config.root` and read every matching module.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the filter is not a
/// valid glob, or the walk hits an I/O error. Files that are not readable
/// assemblies are never an error; they come back with `is_error` set.
pub fn run(config: &Config) -> Result<RunResult> {
    run_with_reader(config, &ClrReader)
}

/// Like [`run`], with a caller-supplied metadata reader.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with_reader<R: IdentityReader + ?Sized>(
    config: &Config,
    reader: &R,
) -> Result<RunResult> {
    let root = paths::resolve_root(&config.root)?;
    let pattern = normalize_filter(config.filter.as_deref(), &config.extension)?;
    let matcher = NameMatcher::new(&pattern)?;
    log::info!("scanning {} for {}", root.display(), matcher.pattern());

    let mut records = Vec::new();
    for path in filesystem::walk_matching(&root, &matcher) {
        let path = path?;
        records.push(metadata::extract(reader, &path, &root));
    }

    let result = RunResult {
        root,
        pattern,
        records,
    };
    log::info!(
        "{} files matched, {} unreadable",
        result.scanned(),
        result.failures()
    );
    Ok(result)
}
