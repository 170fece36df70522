use std::collections::HashMap;

use crate::error::MergeError;
use crate::model::{Batch, MergeOutcome, MergeSummary, Table, Value};
use crate::plan::MergePlan;

/// Group key: canonical key strings in key-column order. `None` is a null
/// key, its own bucket — it matches other null keys and nothing else.
type GroupKey = Vec<Option<String>>;

/// Rows of one group, projected onto the combined schema, with the index of
/// the batch each row came from. Rows keep input order.
struct Group {
    rows: Vec<(usize, Vec<Value>)>,
}

/// Merge tagged batches into one table, grouped by the plan's key columns.
///
/// Stateless one-shot transform. Groups appear in first-seen order of key
/// tuples across the concatenation of batches; within a group, values merge
/// in first-seen order. Any schema violation aborts the whole call.
pub fn reconcile(plan: &MergePlan, batches: &[Batch]) -> Result<MergeOutcome, MergeError> {
    plan.validate()?;

    // Combined schema: first-seen union of batch columns. Batches may carry
    // differing schemas; a column absent from a batch reads as Null there.
    let mut combined: Vec<String> = Vec::new();
    for batch in batches {
        for col in &batch.table.columns {
            if !combined.contains(col) {
                combined.push(col.clone());
            }
        }
    }

    // Every batch must carry every key column.
    let mut batch_key_cols: Vec<Vec<usize>> = Vec::with_capacity(batches.len());
    for batch in batches {
        let mut cols = Vec::with_capacity(plan.key_columns.len());
        for key in &plan.key_columns {
            let idx = batch.table.column_index(key).ok_or_else(|| {
                MergeError::MissingKeyColumn {
                    source: batch.source.clone(),
                    column: key.clone(),
                }
            })?;
            cols.push(idx);
        }
        batch_key_cols.push(cols);
    }

    // The special column must exist somewhere, and the conflict column it
    // implies must not shadow an input column. Vacuous with zero batches:
    // that case is a valid empty merge, not an error.
    let special_pos = match (&plan.special_column, batches.is_empty()) {
        (Some(special), false) => {
            let pos = combined.iter().position(|c| c == special).ok_or_else(|| {
                MergeError::MissingSpecialColumn { column: special.clone() }
            })?;
            if combined.contains(&plan.conflict_column) {
                return Err(MergeError::ConflictColumnTaken {
                    column: plan.conflict_column.clone(),
                });
            }
            Some(pos)
        }
        _ => None,
    };

    // Partition into groups, preserving first-seen group order.
    let mut group_index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut input_rows = 0usize;

    for (batch_idx, batch) in batches.iter().enumerate() {
        let col_map: Vec<Option<usize>> = combined
            .iter()
            .map(|c| batch.table.column_index(c))
            .collect();
        let key_cols = &batch_key_cols[batch_idx];

        for row in &batch.table.rows {
            input_rows += 1;
            let key: GroupKey = key_cols
                .iter()
                .map(|&i| row.get(i).unwrap_or(&Value::Null).canonical())
                .collect();
            let projected: Vec<Value> = col_map
                .iter()
                .map(|m| match m {
                    Some(i) => row.get(*i).cloned().unwrap_or(Value::Null),
                    None => Value::Null,
                })
                .collect();

            let idx = *group_index.entry(key).or_insert_with(|| {
                groups.push(Group { rows: Vec::new() });
                groups.len() - 1
            });
            groups[idx].rows.push((batch_idx, projected));
        }
    }

    // Output schema: key columns in caller order, remaining combined columns
    // in first-seen order, then the conflict column when one is implied.
    let mut out_columns: Vec<String> = plan.key_columns.clone();
    let ordinary: Vec<usize> = combined
        .iter()
        .enumerate()
        .filter(|(_, c)| !plan.key_columns.contains(c))
        .map(|(i, _)| i)
        .collect();
    for &i in &ordinary {
        out_columns.push(combined[i].clone());
    }
    if special_pos.is_some() {
        out_columns.push(plan.conflict_column.clone());
    }

    let key_pos: Vec<usize> = plan
        .key_columns
        .iter()
        .map(|k| {
            // combined holds every key column: each batch was checked above
            // and key checks are vacuous with zero batches (no groups).
            combined.iter().position(|c| c == k).unwrap_or(0)
        })
        .collect();

    let mut out = Table::new(out_columns);
    let mut conflicts = 0usize;

    for group in &groups {
        let mut row: Vec<Value> = Vec::with_capacity(out.columns.len());

        // Key values are shared across the group; copy them from its first
        // record.
        let (_, first) = &group.rows[0];
        for &i in &key_pos {
            row.push(first[i].clone());
        }

        // Ordinary columns (the special column included): deduplicated,
        // order-preserving union of non-null canonical strings.
        for &i in &ordinary {
            let joined = union_join(group.rows.iter().map(|(_, r)| r[i].canonical()));
            row.push(Value::Text(joined));
        }

        if let Some(sp) = special_pos {
            let tags = conflict_tags(group, sp, batches);
            if !tags.is_empty() {
                conflicts += 1;
            }
            row.push(Value::Text(tags));
        }

        out.push_row(row);
    }

    Ok(MergeOutcome {
        summary: MergeSummary {
            input_batches: batches.len(),
            input_rows,
            groups: groups.len(),
            conflicts,
        },
        table: out,
    })
}

/// Join distinct non-null canonical strings with ", ", first-seen order.
fn union_join(values: impl Iterator<Item = Option<String>>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for value in values.flatten() {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.join(", ")
}

/// Provenance tags for a conflicted group: the source of the first record
/// carrying each distinct special value, one tag per value in order of the
/// value's first appearance. Empty when the group holds fewer than two
/// distinct special values.
fn conflict_tags(group: &Group, special: usize, batches: &[Batch]) -> String {
    let mut distinct: Vec<(String, usize)> = Vec::new();
    for (batch_idx, row) in &group.rows {
        if let Some(canonical) = row[special].canonical() {
            if !distinct.iter().any(|(v, _)| v == &canonical) {
                distinct.push((canonical, *batch_idx));
            }
        }
    }
    if distinct.len() < 2 {
        return String::new();
    }
    distinct
        .iter()
        .map(|(_, b)| batches[*b].source.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Vec<Value> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Value::Null
                } else {
                    Value::Text((*v).to_string())
                }
            })
            .collect()
    }

    fn batch(source: &str, columns: &[&str], rows: &[&[&str]]) -> Batch {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(text_row(row));
        }
        Batch::new(source, table)
    }

    fn cell(table: &Table, row: usize, column: &str) -> String {
        let idx = table.column_index(column).unwrap();
        match table.value(row, idx) {
            Value::Text(s) => s.clone(),
            other => panic!("expected text in {column}, got {other:?}"),
        }
    }

    #[test]
    fn union_join_dedups_in_first_seen_order() {
        let values = ["q", "p", "q", "r"]
            .iter()
            .map(|v| Some(v.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(union_join(values.into_iter()), "q, p, r");
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let b = batch(
            "f.csv",
            &["k", "v"],
            &[&["z", "1"], &["a", "2"], &["z", "3"]],
        );
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome = reconcile(&plan, &[b]).unwrap();
        // Encounter order, not sorted order.
        assert_eq!(cell(&outcome.table, 0, "k"), "z");
        assert_eq!(cell(&outcome.table, 1, "k"), "a");
        assert_eq!(cell(&outcome.table, 0, "v"), "1, 3");
    }

    #[test]
    fn null_keys_bucket_together() {
        let b = batch("f.csv", &["k", "v"], &[&["", "1"], &["x", "2"], &["", "3"]]);
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome = reconcile(&plan, &[b]).unwrap();
        assert_eq!(outcome.summary.groups, 2);
        // Null key group merged both null-keyed rows.
        assert_eq!(cell(&outcome.table, 0, "v"), "1, 3");
    }

    #[test]
    fn null_key_never_matches_empty_like_text() {
        let mut table = Table::new(vec!["k".into(), "v".into()]);
        table.push_row(vec![Value::Null, Value::Text("1".into())]);
        table.push_row(vec![Value::Text("".into()), Value::Text("2".into())]);
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome = reconcile(&plan, &[Batch::new("f.csv", table)]).unwrap();
        // Null and empty text are different buckets.
        assert_eq!(outcome.summary.groups, 2);
    }

    #[test]
    fn all_null_ordinary_column_merges_to_empty_string() {
        let mut table = Table::new(vec!["k".into(), "v".into()]);
        table.push_row(vec![Value::Text("x".into()), Value::Null]);
        table.push_row(vec![Value::Text("x".into()), Value::Null]);
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome = reconcile(&plan, &[Batch::new("f.csv", table)]).unwrap();
        assert_eq!(cell(&outcome.table, 0, "v"), "");
    }

    #[test]
    fn missing_key_column_fails() {
        let b1 = batch("f1.csv", &["a", "z"], &[&["1", "2"]]);
        let b2 = batch("f2.csv", &["a"], &[&["1"]]);
        let plan = MergePlan::new(vec!["a".into(), "z".into()]);
        let err = reconcile(&plan, &[b1, b2]).unwrap_err();
        assert_eq!(
            err,
            MergeError::MissingKeyColumn { source: "f2.csv".into(), column: "z".into() }
        );
    }

    #[test]
    fn missing_special_column_fails() {
        let b = batch("f.csv", &["a"], &[&["1"]]);
        let plan = MergePlan::new(vec!["a".into()]).with_special("tag");
        let err = reconcile(&plan, &[b]).unwrap_err();
        assert_eq!(err, MergeError::MissingSpecialColumn { column: "tag".into() });
    }

    #[test]
    fn conflict_column_collision_fails() {
        let b = batch("f.csv", &["a", "tag", "sources"], &[&["1", "t", "s"]]);
        let plan = MergePlan::new(vec!["a".into()]).with_special("tag");
        let err = reconcile(&plan, &[b]).unwrap_err();
        assert_eq!(err, MergeError::ConflictColumnTaken { column: "sources".into() });
    }

    #[test]
    fn zero_batches_yield_empty_table() {
        let plan = MergePlan::new(vec!["a".into()]).with_special("tag");
        let outcome = reconcile(&plan, &[]).unwrap();
        assert!(outcome.table.rows.is_empty());
        assert_eq!(outcome.summary.groups, 0);
        assert_eq!(outcome.summary.input_rows, 0);
    }

    #[test]
    fn schemas_union_with_nulls_for_absent_columns() {
        let b1 = batch("f1.csv", &["k", "a"], &[&["x", "1"]]);
        let b2 = batch("f2.csv", &["k", "b"], &[&["x", "2"]]);
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome = reconcile(&plan, &[b1, b2]).unwrap();
        assert_eq!(outcome.table.columns, vec!["k", "a", "b"]);
        assert_eq!(cell(&outcome.table, 0, "a"), "1");
        assert_eq!(cell(&outcome.table, 0, "b"), "2");
    }

    #[test]
    fn conflict_tags_may_repeat_a_source() {
        // Two distinct special values first seen in the same file: one tag
        // per value, so the file appears twice.
        let b = batch(
            "f1.csv",
            &["k", "tag"],
            &[&["x", "red"], &["x", "blue"]],
        );
        let plan = MergePlan::new(vec!["k".into()]).with_special("tag");
        let outcome = reconcile(&plan, &[b]).unwrap();
        assert_eq!(cell(&outcome.table, 0, "sources"), "f1.csv, f1.csv");
        assert_eq!(outcome.summary.conflicts, 1);
    }

    #[test]
    fn conflict_tag_order_follows_batch_order_not_name_order() {
        let b2 = batch("zzz.csv", &["k", "tag"], &[&["x", "red"]]);
        let b1 = batch("aaa.csv", &["k", "tag"], &[&["x", "blue"]]);
        let plan = MergePlan::new(vec!["k".into()]).with_special("tag");
        // Caller-supplied batch order, not alphabetical.
        let outcome = reconcile(&plan, &[b2, b1]).unwrap();
        assert_eq!(cell(&outcome.table, 0, "sources"), "zzz.csv, aaa.csv");
    }

    #[test]
    fn key_copied_from_first_record_preserves_type() {
        let mut t1 = Table::new(vec!["k".into(), "v".into()]);
        t1.push_row(vec![Value::Int(1), Value::Text("p".into())]);
        let mut t2 = Table::new(vec!["k".into(), "v".into()]);
        t2.push_row(vec![Value::Text("1".into()), Value::Text("q".into())]);
        let plan = MergePlan::new(vec!["k".into()]);
        let outcome =
            reconcile(&plan, &[Batch::new("f1", t1), Batch::new("f2", t2)]).unwrap();
        // Int(1) and Text("1") share the canonical key "1".
        assert_eq!(outcome.summary.groups, 1);
        assert_eq!(outcome.table.rows[0][0], Value::Int(1));
        assert_eq!(cell(&outcome.table, 0, "v"), "p, q");
    }
}
