use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole scan.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to resolve scan root '{path}': {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan root '{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("Invalid name filter '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reasons a single file could not be read as an assembly.
///
/// These never escape the extractor; they only end up in debug logs.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of data at offset {offset:#x} (needed {needed} bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("Missing MZ signature")]
    NotPortableExecutable,

    #[error("Missing PE signature at offset {0:#x}")]
    BadPeSignature(usize),

    #[error("Unsupported optional header magic {0:#06x}")]
    UnsupportedOptionalHeader(u16),

    #[error("Image has no CLI header")]
    NoCliHeader,

    #[error("RVA {0:#x} is not mapped by any section")]
    UnmappedRva(u32),

    #[error("Bad metadata signature {0:#010x}")]
    BadMetadataSignature(u32),

    #[error("Metadata stream '{0}' is missing")]
    MissingStream(&'static str),

    #[error("Heap index {index:#x} is outside the {heap} heap")]
    HeapIndex { heap: &'static str, index: u32 },

    #[error("String heap entry is not valid UTF-8")]
    InvalidString,

    #[error("Module has no Assembly table row")]
    NotAnAssembly,
}
