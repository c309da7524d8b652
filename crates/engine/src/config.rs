use crate::options::OutputFormat;
use crate::pattern::DEFAULT_EXTENSION;
use derive_builder::Builder;
use std::path::PathBuf;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// Directory to scan; resolved and canonicalized by `run`.
    #[builder(default = "PathBuf::from(\".\")")]
    pub root: PathBuf,
    /// Raw name filter as given by the user.
    #[builder(default)]
    pub filter: Option<String>,
    /// Module extension appended to bare filters.
    #[builder(default = "DEFAULT_EXTENSION.to_string()")]
    pub extension: String,
    #[builder(default = "OutputFormat::Table")]
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            filter: None,
            extension: DEFAULT_EXTENSION.to_string(),
            format: OutputFormat::Table,
        }
    }
}
