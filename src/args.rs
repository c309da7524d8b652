// src/args.rs
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::options::CliOutputFormat;

/// Top-level CLI arguments parsed via clap.
#[derive(Parser, Debug)]
#[command(
    name = "asm_versions",
    version = crate::VERSION,
    about = "List assembly names, versions and public key tokens found under a directory"
)]
pub struct Args {
    /// Directory to scan recursively
    #[arg(value_hint = ValueHint::DirPath, default_value = ".")]
    pub path: PathBuf,

    /// File name filter; a bare name gets the module extension appended
    /// (e.g. `Newtonsoft.Json`), wildcards are used as given (e.g. `*Json*`)
    pub filter: Option<String>,

    /// Module extension used when completing a bare filter
    #[arg(long, default_value = asm_versions_engine::pattern::DEFAULT_EXTENSION)]
    pub ext: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: CliOutputFormat,

    /// Log progress to stderr (-v info, -vv also lists unreadable files)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
