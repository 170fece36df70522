use chrono::NaiveDate;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single scalar cell value.
///
/// The variants follow what spreadsheet readers actually produce. Grouping
/// and dedup work on [`Value::canonical`] strings, so the variant only
/// matters for how a value renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Canonical string form used for grouping and dedup.
    ///
    /// Stringify-then-compare: `Text("1")` and `Float(1.5)` rendered "1.5"
    /// are compared as the strings they produce, with no numeric or date
    /// normalization. `Null` has no canonical form and contributes nothing
    /// to a merged value.
    pub fn canonical(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables + batches
// ---------------------------------------------------------------------------

/// Rows sharing one ordered schema.
///
/// A row shorter than the schema reads as `Null` in the missing positions;
/// readers are not required to pad trailing empties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Value at (row, column index), with `Null` for short rows.
    pub fn value(&self, row: usize, col: usize) -> &Value {
        self.rows[row].get(col).unwrap_or(&Value::Null)
    }
}

/// A loaded table plus the provenance tag of the source it came from
/// (typically the path it was read from).
#[derive(Debug, Clone)]
pub struct Batch {
    pub source: String,
    pub table: Table,
}

impl Batch {
    pub fn new(source: impl Into<String>, table: Table) -> Self {
        Self { source: source.into(), table }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub input_batches: usize,
    pub input_rows: usize,
    pub groups: usize,
    pub conflicts: usize,
}

/// Merged table plus run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub summary: MergeSummary,
    pub table: Table,
}
