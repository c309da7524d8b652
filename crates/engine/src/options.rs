#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned, human-readable columns
    #[default]
    Table,
    Json,
}
