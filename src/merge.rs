//! Appends new trailing columns to a target loop block.
//!
//! Alignment is **positional**: the `j`-th non-blank target row receives the
//! `j`-th value set, whatever particle either row describes. Both inputs must
//! already be in the same particle order (for example by sharing acquisition
//! order after [`crate::key::sort_rows_by_key`]). Nothing here can detect a
//! dropped or reordered particle; [`crate::combine`] can at least compare row
//! counts before merging.

use crate::{
    columns::{ColumnIndex, Declaration},
    document::Document,
    rows::FIELD_SEPARATOR,
    scanner::TableLayout,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub declarations: Vec<String>,
    pub rows: Vec<String>,
    pub rows_extended: usize,
}

/// Returns the extended declaration block and data rows.
///
/// New declarations are numbered from the highest explicit ordinal already
/// present (0 when none carry one). Blank rows pass through and do not
/// consume a value set; rows beyond the last value set are left unextended.
pub fn merge<S: AsRef<str>>(
    declaration_lines: &[S],
    data_rows: &[S],
    new_columns_per_row: &[Vec<String>],
    new_column_names: &[String],
) -> Merged {
    let index = ColumnIndex::build(declaration_lines.iter().map(|line| line.as_ref()));
    let base = index.max_ordinal();

    let mut declarations = declaration_lines
        .iter()
        .map(|line| line.as_ref().to_string())
        .collect::<Vec<_>>();
    declarations.extend(
        new_column_names
            .iter()
            .zip(base + 1..)
            .map(|(name, ordinal)| Declaration::render(name, ordinal)),
    );

    let mut position = 0usize;
    let mut rows_extended = 0usize;
    let rows = data_rows
        .iter()
        .map(|row| {
            let row = row.as_ref();
            if row.trim().is_empty() {
                return row.to_string();
            }
            let values = new_columns_per_row.get(position);
            position += 1;
            match values {
                Some(values) => {
                    rows_extended += 1;
                    format!(
                        "{row}{FIELD_SEPARATOR}{}",
                        values.join(FIELD_SEPARATOR)
                    )
                }
                None => row.to_string(),
            }
        })
        .collect();

    Merged {
        declarations,
        rows,
        rows_extended,
    }
}

/// Applies [`merge`] to the table at `layout` inside `document`.
pub fn merge_into(
    document: &mut Document,
    layout: &TableLayout,
    new_columns_per_row: &[Vec<String>],
    new_column_names: &[String],
) -> usize {
    let declaration_lines = layout.declaration_lines(document);
    let data_rows = document.lines()[layout.data.clone()]
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();
    let merged = merge(
        declaration_lines.as_slice(),
        data_rows.as_slice(),
        new_columns_per_row,
        new_column_names,
    );
    let appended = merged.declarations[declaration_lines.len()..].to_vec();

    // Rows sit after the declarations, so replace them before inserting.
    document.splice(layout.data.clone(), merged.rows);
    document.insert_lines(layout.declaration_end(), appended);
    merged.rows_extended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn ordinals_continue_from_highest() {
        let merged = merge(
            &["_a #1", "_b #2"],
            &[] as &[&str],
            &[],
            &names(&["_x", "_y", "_z"]),
        );
        assert_eq!(
            merged.declarations,
            vec!["_a #1", "_b #2", "_x #3", "_y #4", "_z #5"]
        );
    }

    #[test]
    fn blank_rows_do_not_consume_values() {
        let values = vec![names(&["1", "2"]), names(&["3", "4"])];
        let merged = merge(
            &["_a #1"],
            &["r0", "", "r1", "r2"],
            &values,
            &names(&["_x", "_y"]),
        );
        assert_eq!(merged.rows, vec!["r0  1  2", "", "r1  3  4", "r2"]);
        assert_eq!(merged.rows_extended, 2);
    }
}
