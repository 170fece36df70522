// Excel workbook import/export (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use sheetfuse_merge::{Table, Value};

/// Import one sheet of a workbook. The first row is the schema; every later
/// row becomes a record. Defaults to the first sheet.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(format!("{}: workbook contains no sheets", path.display()));
    }
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(format!(
                    "{}: no sheet named '{name}' (sheets: {})",
                    path.display(),
                    sheet_names.join(", ")
                ));
            }
            name.to_string()
        }
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("failed to read sheet '{sheet_name}': {e}"))?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| cell_to_value(cell).canonical().unwrap_or_default())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(columns);
    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_to_value).collect();
        // Stray formatting can extend the used range past the data; fully
        // blank rows carry no record.
        if values.iter().all(|v| v.is_null()) {
            continue;
        }
        table.push_row(values);
    }

    Ok(table)
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Float(n) => Value::Float(*n),
        Data::Int(n) => Value::Int(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => Value::Text(format!("#{e:?}")),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match dt.as_datetime() {
                // Small epsilon: a pure date has no time fraction
                Some(ndt) if serial.fract().abs() < 1e-4 => Value::Date(ndt.date()),
                Some(ndt) => Value::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Value::Float(serial),
            }
        }
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Write a table as a single-sheet workbook with a bold header row.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|e| e.to_string())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let target_row = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            let col = c as u16;
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    worksheet
                        .write_boolean(target_row, col, *b)
                        .map_err(|e| e.to_string())?;
                }
                Value::Int(n) => {
                    worksheet
                        .write_number(target_row, col, *n as f64)
                        .map_err(|e| e.to_string())?;
                }
                Value::Float(n) => {
                    worksheet
                        .write_number(target_row, col, *n)
                        .map_err(|e| e.to_string())?;
                }
                Value::Text(s) => {
                    worksheet
                        .write_string(target_row, col, s)
                        .map_err(|e| e.to_string())?;
                }
                Value::Date(d) => {
                    worksheet
                        .write_string(target_row, col, d.format("%Y-%m-%d").to_string())
                        .map_err(|e| e.to_string())?;
                }
            }
        }
    }

    workbook.save(path).map_err(|e| e.to_string())?;
    Ok(())
}
