use std::fmt;

/// Schema misconfiguration. Always fatal to the merge call; no partial
/// output is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// No key columns were supplied.
    NoKeyColumns,
    /// The same column was listed twice as a key.
    DuplicateKeyColumn { column: String },
    /// A key column is missing from one batch's schema.
    MissingKeyColumn { source: String, column: String },
    /// The special column is absent from the combined schema.
    MissingSpecialColumn { column: String },
    /// The special column is also a key column.
    SpecialIsKey { column: String },
    /// The provenance-conflict column name collides with an input column.
    ConflictColumnTaken { column: String },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKeyColumns => write!(f, "at least one key column is required"),
            Self::DuplicateKeyColumn { column } => {
                write!(f, "key column '{column}' listed more than once")
            }
            Self::MissingKeyColumn { source, column } => {
                write!(f, "source '{source}': missing key column '{column}'")
            }
            Self::MissingSpecialColumn { column } => {
                write!(f, "special column '{column}' not found in any input")
            }
            Self::SpecialIsKey { column } => {
                write!(f, "special column '{column}' is also a key column")
            }
            Self::ConflictColumnTaken { column } => {
                write!(f, "conflict column '{column}' collides with an input column")
            }
        }
    }
}

impl std::error::Error for MergeError {}
