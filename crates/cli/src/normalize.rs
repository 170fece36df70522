//! Caller-side column normalization.
//!
//! The engine compares key values exactly as given, so date columns must
//! reach it in one canonical layout, and noisy text columns are cleaned
//! before they fan out into merged value lists.

use chrono::NaiveDate;
use sheetfuse_merge::{Table, Value};

/// Layouts tried in order; first parse wins, so day-first beats month-first
/// for ambiguous values like 03/04/2026.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"];

/// Apply date canonicalization and text cleaning to the named columns.
///
/// Column names with no match in this table are ignored here; the engine
/// reports missing key columns with the source attached.
pub fn apply(table: &mut Table, date_columns: &[String], clean_columns: &[String]) {
    for name in date_columns {
        if let Some(idx) = table.column_index(name) {
            for row in &mut table.rows {
                if let Some(value) = row.get_mut(idx) {
                    *value = canonicalize_date(value);
                }
            }
        }
    }
    for name in clean_columns {
        if let Some(idx) = table.column_index(name) {
            for row in &mut table.rows {
                if let Some(value) = row.get_mut(idx) {
                    *value = clean_value(value);
                }
            }
        }
    }
}

/// Rewrite a textual date to its `YYYY-MM-DD` form. Unparseable values stay
/// as-is: they then group as their own bucket, which is visible in the
/// output rather than silently wrong.
fn canonicalize_date(value: &Value) -> Value {
    match value {
        Value::Text(s) => {
            let trimmed = s.trim();
            // ISO datetime: keep the date part
            let head = trimmed
                .split(|c| c == 'T' || c == ' ')
                .next()
                .unwrap_or(trimmed);
            for layout in DATE_LAYOUTS {
                if let Ok(date) = NaiveDate::parse_from_str(head, layout) {
                    return Value::Date(date);
                }
            }
            value.clone()
        }
        other => other.clone(),
    }
}

fn clean_value(value: &Value) -> Value {
    match value {
        Value::Text(s) => {
            let cleaned = clean_text(s);
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Text(cleaned)
            }
        }
        other => other.clone(),
    }
}

/// Strip Unicode control characters, collapse whitespace runs to single
/// spaces, and trim.
pub fn clean_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.chars() {
        // \t, \r, \n are control characters too; treat them as whitespace
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_table(column: &str, values: &[&str]) -> Table {
        let mut table = Table::new(vec![column.to_string()]);
        for v in values {
            table.push_row(vec![Value::Text((*v).to_string())]);
        }
        table
    }

    #[test]
    fn common_date_layouts_canonicalize() {
        let mut table = text_table(
            "Date",
            &["2026-01-15", "2026/01/15", "15/01/2026", "15.01.2026"],
        );
        apply(&mut table, &["Date".into()], &[]);
        for row in &table.rows {
            assert_eq!(row[0].canonical().as_deref(), Some("2026-01-15"));
        }
    }

    #[test]
    fn iso_datetime_keeps_date_part() {
        let mut table = text_table("Date", &["2026-01-15T09:30:00", "2026-01-15 09:30:00"]);
        apply(&mut table, &["Date".into()], &[]);
        for row in &table.rows {
            assert_eq!(row[0].canonical().as_deref(), Some("2026-01-15"));
        }
    }

    #[test]
    fn unparseable_dates_pass_through() {
        let mut table = text_table("Date", &["mid-January", "n/a"]);
        apply(&mut table, &["Date".into()], &[]);
        assert_eq!(table.rows[0][0], Value::Text("mid-January".into()));
        assert_eq!(table.rows[1][0], Value::Text("n/a".into()));
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let mut table = text_table("Date", &["2026-01-15"]);
        apply(&mut table, &["Missing".into()], &["AlsoMissing".into()]);
        assert_eq!(table.rows[0][0], Value::Text("2026-01-15".into()));
    }

    #[test]
    fn clean_text_strips_control_and_collapses_spaces() {
        assert_eq!(clean_text("  Acme\u{0000}\tCorp   Ltd  "), "Acme Corp Ltd");
        assert_eq!(clean_text("one\r\ntwo"), "one two");
    }

    #[test]
    fn clean_keeps_non_ascii_letters() {
        assert_eq!(clean_text("café  ümlaut"), "café ümlaut");
    }

    #[test]
    fn cleaning_to_nothing_becomes_null() {
        let mut table = text_table("Title", &["\u{0007}\u{0008}"]);
        apply(&mut table, &[], &["Title".into()]);
        assert_eq!(table.rows[0][0], Value::Null);
    }
}
