//! `sheetfuse-io` — file I/O for merge inputs and outputs.
//!
//! CSV/TSV through the `csv` crate with delimiter sniffing, Excel workbooks
//! through calamine (read) and rust_xlsxwriter (write). All errors are
//! strings; the CLI maps them to exit codes.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use sheetfuse_merge::{Batch, Table};

/// Supported tabular formats, inferred from a path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    Excel,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("tsv") => Ok(Format::Tsv),
            Some("xlsx") | Some("xls") | Some("xlsb") | Some("ods") => Ok(Format::Excel),
            Some(other) => Err(format!("unsupported file extension: .{other}")),
            None => Err(format!("cannot infer format of {}", path.display())),
        }
    }
}

/// Load one input file as a batch tagged with the path it was named by.
pub fn load_batch(path: &Path, sheet: Option<&str>) -> Result<Batch, String> {
    let table = load_table(path, sheet)?;
    Ok(Batch::new(path.to_string_lossy(), table))
}

/// Load one input file as a bare table. `sheet` only applies to workbooks.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    match Format::from_path(path)? {
        Format::Csv => csv::import(path),
        Format::Tsv => csv::import_with_delimiter(path, b'\t'),
        Format::Excel => xlsx::import(path, sheet),
    }
}

/// Write a table in the format the output path's extension names.
pub fn write_table(table: &Table, path: &Path) -> Result<(), String> {
    match Format::from_path(path)? {
        Format::Csv => csv::export(table, path),
        Format::Tsv => csv::export_with_delimiter(table, path, b'\t'),
        Format::Excel => xlsx::export(table, path),
    }
}
