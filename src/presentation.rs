// src/presentation.rs
use crate::error::Result;
use asm_versions_engine::RunResult;
use asm_versions_engine::config::Config;
use asm_versions_engine::options::OutputFormat;
use asm_versions_engine::record::FileMetadataRecord;
use comfy_table::{ContentArrangement, Table, TableComponent, presets};
use std::cmp::Ordering;
use std::io::Write;

const HEADERS: [&str; 4] = ["Name", "Version", "PublicKeyToken", "Path"];

/// Name ascending, then version descending, then path ascending.
pub fn compare_records(a: &FileMetadataRecord, b: &FileMetadataRecord) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| b.version.cmp(&a.version))
        .then_with(|| a.relative_path.cmp(&b.relative_path))
}

/// Drops unreadable files and sorts the rest for display.
///
/// The sort is stable: rows that compare equal keep their scan order.
pub fn displayable_rows(records: &[FileMetadataRecord]) -> Vec<&FileMetadataRecord> {
    let mut rows: Vec<_> = records.iter().filter(|r| !r.is_error).collect();
    rows.sort_by(|a, b| compare_records(a, b));
    rows
}

pub fn print_results(result: &RunResult, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_results(result, config, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn write_results(result: &RunResult, config: &Config, out: &mut impl Write) -> Result<()> {
    let rows = displayable_rows(&result.records);
    match config.format {
        OutputFormat::Table => write_table(&rows, out),
        OutputFormat::Json => write_json(&rows, out),
    }
}

fn write_table(rows: &[&FileMetadataRecord], out: &mut impl Write) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(HEADERS);
    table.set_style(TableComponent::HeaderLines, '-');

    for r in rows {
        table.add_row(vec![
            r.name.clone(),
            r.version.to_string(),
            r.public_key_token.to_string(),
            r.relative_path.clone(),
        ]);
    }
    for column in table.column_iter_mut() {
        column.set_padding((0, 2));
    }

    for line in table.lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn write_json(rows: &[&FileMetadataRecord], out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)?;
    Ok(())
}
