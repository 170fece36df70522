use crate::error::MergeError;

/// Name of the output provenance-conflict column unless overridden.
pub const DEFAULT_CONFLICT_COLUMN: &str = "sources";

/// What to merge: which columns form the group key, which single column gets
/// conflict-aware handling, and what to call the provenance-conflict column
/// in the output.
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Ordered, non-empty. Every batch must carry every key column.
    pub key_columns: Vec<String>,
    /// At most one column, distinct from all key columns.
    pub special_column: Option<String>,
    /// Appended to the output schema when a special column is configured.
    pub conflict_column: String,
}

impl MergePlan {
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            special_column: None,
            conflict_column: DEFAULT_CONFLICT_COLUMN.to_string(),
        }
    }

    pub fn with_special(mut self, column: impl Into<String>) -> Self {
        self.special_column = Some(column.into());
        self
    }

    pub fn with_conflict_column(mut self, column: impl Into<String>) -> Self {
        self.conflict_column = column.into();
        self
    }

    /// Checks internal to the plan; schema checks against actual batches
    /// happen in [`crate::reconcile::reconcile`].
    pub fn validate(&self) -> Result<(), MergeError> {
        if self.key_columns.is_empty() {
            return Err(MergeError::NoKeyColumns);
        }
        for (i, column) in self.key_columns.iter().enumerate() {
            if self.key_columns[..i].contains(column) {
                return Err(MergeError::DuplicateKeyColumn { column: column.clone() });
            }
        }
        if let Some(special) = &self.special_column {
            if self.key_columns.contains(special) {
                return Err(MergeError::SpecialIsKey { column: special.clone() });
            }
        }
        Ok(())
    }
}
