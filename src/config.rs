// src/config.rs
use crate::args::Args;
pub use asm_versions_engine::config::{Config, ConfigBuilder};
use asm_versions_engine::options::OutputFormat;

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let format: OutputFormat = args.format.into();
        Self {
            root: args.path,
            filter: args.filter,
            extension: args.ext,
            format,
        }
    }
}
