//! TOML merge profiles - the `merge` flags, kept in a file.
//!
//! Explicit flags override profile values; validation of the combined
//! settings happens in the merge command once both are resolved.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeProfile {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub key_columns: Vec<String>,
    #[serde(default)]
    pub special_column: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub conflict_column: Option<String>,
    #[serde(default)]
    pub normalize_dates: Vec<String>,
    #[serde(default)]
    pub clean: Vec<String>,
    #[serde(default)]
    pub sheet: Option<String>,
}

impl MergeProfile {
    pub fn from_toml(input: &str) -> Result<Self, String> {
        toml::from_str(input).map_err(|e| format!("profile parse error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_profile() {
        let profile = MergeProfile::from_toml(
            r#"
files = ["q1.xlsx", "q2.xlsx"]
key_columns = ["Company", "Date"]
special_column = "Tag"
output = "merged.xlsx"
normalize_dates = ["Date"]
clean = ["Title"]
"#,
        )
        .unwrap();
        assert_eq!(profile.files, vec!["q1.xlsx", "q2.xlsx"]);
        assert_eq!(profile.key_columns, vec!["Company", "Date"]);
        assert_eq!(profile.special_column.as_deref(), Some("Tag"));
        assert_eq!(profile.output.as_deref(), Some("merged.xlsx"));
        assert_eq!(profile.normalize_dates, vec!["Date"]);
        assert!(profile.sheet.is_none());
    }

    #[test]
    fn reject_unknown_field() {
        let err = MergeProfile::from_toml("files = []\nspeciall_column = \"Tag\"\n").unwrap_err();
        assert!(err.contains("speciall_column"), "{err}");
    }

    #[test]
    fn empty_profile_is_all_defaults() {
        let profile = MergeProfile::from_toml("").unwrap();
        assert!(profile.files.is_empty());
        assert!(profile.key_columns.is_empty());
        assert!(profile.special_column.is_none());
    }
}
