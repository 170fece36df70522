// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use sheetfuse_merge::{Table, Value};

/// Import a CSV file, sniffing the delimiter. The header row is the schema;
/// empty fields read as null.
pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Pick the delimiter whose field counts stay most consistent over the first
/// ten lines. Candidates: tab, semicolon, comma, pipe; comma when nothing
/// splits the header.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // A viable delimiter splits the header into more than one field
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header count, weighted by field count so
        // a wider split wins ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {e}", path.display()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let row: Vec<Value> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Value::Null
                } else {
                    Value::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer
        .write_record(&table.columns)
        .map_err(|e| e.to_string())?;

    for row in &table.rows {
        // Null renders empty; short rows pad to the schema width.
        let record: Vec<String> = (0..table.columns.len())
            .map(|i| {
                row.get(i)
                    .and_then(|v| v.canonical())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn sniff_semicolon_with_commas_in_values() {
        let content =
            "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn import_reads_header_and_nulls() {
        let table = import_from_string("A,B,Tag\nx,,red\ny,q,\n", b',').unwrap();
        assert_eq!(table.columns, vec!["A", "B", "Tag"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Value::Text("x".into()));
        assert_eq!(table.rows[0][1], Value::Null);
        assert_eq!(table.rows[1][2], Value::Null);
    }

    #[test]
    fn roundtrip_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["A".into(), "B".into()]);
        table.push_row(vec![Value::Text("x".into()), Value::Text("p, q".into())]);
        table.push_row(vec![Value::Text("y".into()), Value::Null]);

        export(&table, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"p, q\""), "joined value should be quoted: {content}");

        let back = import(&path).unwrap();
        assert_eq!(back.columns, table.columns);
        assert_eq!(back.rows[0][1], Value::Text("p, q".into()));
        assert_eq!(back.rows[1][1], Value::Null);
    }

    #[test]
    fn windows_1252_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "café" in Windows-1252: é = 0xE9
        fs::write(&path, [b'A', b'\n', b'c', b'a', b'f', 0xE9, b'\n']).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.rows[0][0], Value::Text("café".into()));
    }
}
