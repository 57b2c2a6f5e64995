//! Structural edit payloads.
//!
//! Every structural change (row/column add, insert, remove, clone) is made
//! reversible by one compact string payload: a tag, then fields separated by
//! `\x01` and records separated by `\x02`. Cell text may legitimately contain
//! both separators, so text is escaped into the private-use plane before
//! embedding and unescaped on decode. Decoding is fail-soft: a malformed
//! payload decodes to `None` and the undo step becomes a no-op.

use crate::store::TabularStore;

const FIELD_SEP: char = '\u{0001}';
const RECORD_SEP: char = '\u{0002}';
const FIELD_ESC: char = '\u{E000}';
const RECORD_ESC: char = '\u{E001}';

const TAG_REMOVE_COLUMNS: &str = "REMOVE_COLUMNS:";
const TAG_REMOVE_ROWS: &str = "REMOVE_ROWS:";
const TAG_RESTORE_COLUMNS: &str = "RESTORE_COLUMNS:";
const TAG_RESTORE_ROWS: &str = "RESTORE_ROWS:";

/// A decoded structural inverse, ready to be replayed against a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralOp {
    /// Delete the named columns (inverse of add/insert/clone-columns).
    RemoveColumns { names: Vec<String> },
    /// Delete `count` contiguous rows starting at `start`, then renumber
    /// (inverse of add/insert/clone-rows).
    RemoveRows { start: usize, count: usize },
    /// Re-create columns at their original ordinals and refill every row's
    /// values for those columns (inverse of remove-columns).
    RestoreColumns {
        columns: Vec<(usize, String)>,
        rows: Vec<Vec<String>>,
    },
    /// Re-insert rows at their original positions with all column values,
    /// then renumber (inverse of remove-rows).
    RestoreRows {
        positions: Vec<usize>,
        rows: Vec<Vec<String>>,
    },
}

pub fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            FIELD_SEP => FIELD_ESC,
            RECORD_SEP => RECORD_ESC,
            other => other,
        })
        .collect()
}

pub fn unescape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            FIELD_ESC => FIELD_SEP,
            RECORD_ESC => RECORD_SEP,
            other => other,
        })
        .collect()
}

// =============================================================================
// Encoding
// =============================================================================

pub fn encode_remove_columns(names: &[String]) -> String {
    let mut out = String::from(TAG_REMOVE_COLUMNS);
    out.push_str(&join_fields(names.iter().map(|n| escape(n))));
    out
}

pub fn encode_remove_rows(start: usize, count: usize) -> String {
    format!("{TAG_REMOVE_ROWS}{start}:{count}")
}

/// Snapshot the columns at `indices` (ascending) before they are removed:
/// ordinal/name pairs, then each row's values for those columns only.
/// Out-of-range indices are dropped.
pub fn encode_restore_columns(store: &TabularStore, indices: &[usize]) -> String {
    let indices: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| i < store.column_count())
        .collect();
    let mut out = String::from(TAG_RESTORE_COLUMNS);
    let pairs = indices
        .iter()
        .map(|&i| format!("{}:{}", i, escape(store.columns()[i].name())));
    out.push_str(&join_fields(pairs));
    for row in store.rows() {
        out.push(RECORD_SEP);
        let values = indices.iter().map(|&i| escape(&row.cells()[i]));
        out.push_str(&join_fields(values));
    }
    out
}

/// Snapshot the rows at `positions` (ascending) before they are removed:
/// count, original positions, then each row's full cell values.
/// Out-of-range positions are dropped.
pub fn encode_restore_rows(store: &TabularStore, positions: &[usize]) -> String {
    let positions: Vec<usize> = positions
        .iter()
        .copied()
        .filter(|&p| p < store.row_count())
        .collect();
    let mut out = String::from(TAG_RESTORE_ROWS);
    out.push_str(&positions.len().to_string());
    out.push(RECORD_SEP);
    out.push_str(&join_fields(positions.iter().map(|p| p.to_string())));
    for &pos in &positions {
        out.push(RECORD_SEP);
        let values = store.rows()[pos].cells().iter().map(|c| escape(c));
        out.push_str(&join_fields(values));
    }
    out
}

fn join_fields<I: Iterator<Item = String>>(fields: I) -> String {
    let mut out = String::new();
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(FIELD_SEP);
        }
        out.push_str(&field);
    }
    out
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a payload back into a structural operation. Returns `None` for an
/// unknown tag, wrong segment counts, non-integer ordinals, or mismatched
/// row arity; the caller treats that as a skipped undo step.
pub fn decode(payload: &str) -> Option<StructuralOp> {
    if let Some(body) = payload.strip_prefix(TAG_REMOVE_COLUMNS) {
        let names: Vec<String> = body.split(FIELD_SEP).map(unescape).collect();
        return Some(StructuralOp::RemoveColumns { names });
    }

    if let Some(body) = payload.strip_prefix(TAG_REMOVE_ROWS) {
        let (start, count) = body.split_once(':')?;
        return Some(StructuralOp::RemoveRows {
            start: start.parse().ok()?,
            count: count.parse().ok()?,
        });
    }

    if let Some(body) = payload.strip_prefix(TAG_RESTORE_COLUMNS) {
        let mut segments = body.split(RECORD_SEP);
        let header = segments.next()?;
        let mut columns = Vec::new();
        for pair in header.split(FIELD_SEP) {
            let (ordinal, name) = pair.split_once(':')?;
            columns.push((ordinal.parse::<usize>().ok()?, unescape(name)));
        }
        let mut rows = Vec::new();
        for segment in segments {
            let values: Vec<String> = segment.split(FIELD_SEP).map(|v| unescape(v)).collect();
            if values.len() != columns.len() {
                return None;
            }
            rows.push(values);
        }
        return Some(StructuralOp::RestoreColumns { columns, rows });
    }

    if let Some(body) = payload.strip_prefix(TAG_RESTORE_ROWS) {
        let mut segments = body.split(RECORD_SEP);
        let count: usize = segments.next()?.parse().ok()?;
        let positions_segment = segments.next()?;
        let positions: Vec<usize> = positions_segment
            .split(FIELD_SEP)
            .map(|p| p.parse::<usize>())
            .collect::<Result<_, _>>()
            .ok()?;
        let rows: Vec<Vec<String>> = segments
            .map(|segment| segment.split(FIELD_SEP).map(|v| unescape(v)).collect())
            .collect();
        if positions.len() != count || rows.len() != count {
            return None;
        }
        return Some(StructuralOp::RestoreRows { positions, rows });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store_with(cells: &[&[&str]]) -> TabularStore {
        let cols = cells.first().map_or(1, |r| r.len());
        let mut store = TabularStore::with_columns(cols);
        for row in cells {
            store.push_row(row.iter().map(|s| s.to_string()).collect());
        }
        store.sync_header_from_row0();
        store
    }

    #[test]
    fn escape_round_trips_separators() {
        let nasty = "a\u{1}b\u{2}c\ttab";
        assert_eq!(unescape(&escape(nasty)), nasty);
        assert!(!escape(nasty).contains('\u{1}'));
        assert!(!escape(nasty).contains('\u{2}'));
    }

    #[test]
    fn remove_columns_round_trip() {
        let names = vec!["Col1".to_string(), "Col7".to_string()];
        let decoded = decode(&encode_remove_columns(&names)).unwrap();
        assert_eq!(decoded, StructuralOp::RemoveColumns { names });
    }

    #[test]
    fn remove_rows_round_trip() {
        let decoded = decode(&encode_remove_rows(3, 2)).unwrap();
        assert_eq!(decoded, StructuralOp::RemoveRows { start: 3, count: 2 });
    }

    #[test]
    fn restore_columns_round_trip_with_separators_in_cells() {
        let store = store_with(&[
            &["A", "B\u{1}mid", "C"],
            &["1", "x\u{2}y", "3"],
            &["4", "", "6"],
        ]);
        let payload = encode_restore_columns(&store, &[1]);
        match decode(&payload).unwrap() {
            StructuralOp::RestoreColumns { columns, rows } => {
                assert_eq!(columns, vec![(1, "Col2".to_string())]);
                assert_eq!(rows, vec![
                    vec!["B\u{1}mid".to_string()],
                    vec!["x\u{2}y".to_string()],
                    vec![String::new()],
                ]);
            }
            other => panic!("wrong op: {other:?}"),
        }
    }

    #[test]
    fn restore_rows_round_trip() {
        let store = store_with(&[&["H1", "H2"], &["a", "b"], &["c", "d"]]);
        let payload = encode_restore_rows(&store, &[1, 2]);
        match decode(&payload).unwrap() {
            StructuralOp::RestoreRows { positions, rows } => {
                assert_eq!(positions, vec![1, 2]);
                assert_eq!(rows, vec![
                    vec!["a".to_string(), "b".to_string()],
                    vec!["c".to_string(), "d".to_string()],
                ]);
            }
            other => panic!("wrong op: {other:?}"),
        }
    }

    #[test]
    fn malformed_payloads_decode_to_none() {
        assert_eq!(decode("GARBAGE:stuff"), None);
        assert_eq!(decode("REMOVE_ROWS:3"), None);
        assert_eq!(decode("REMOVE_ROWS:x:y"), None);
        assert_eq!(decode("RESTORE_COLUMNS:notapair"), None);
        assert_eq!(decode("RESTORE_COLUMNS:nine:Col1"), None);
        // Count disagrees with the number of row segments
        assert_eq!(decode("RESTORE_ROWS:2\u{2}1\u{1}2\u{2}a\u{1}b"), None);
    }

    #[test]
    fn truncated_restore_columns_row_is_rejected() {
        let store = store_with(&[&["A", "B"], &["1", "2"]]);
        let payload = encode_restore_columns(&store, &[0, 1]);
        // Chop off the last row segment's second field
        let truncated = payload.rsplit_once('\u{1}').unwrap().0;
        assert_eq!(decode(truncated), None);
    }

    // Cell text drawn from the characters that stress the format: the two
    // separators, tabs, plus plain and non-ASCII text.
    fn arb_cell() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                Just('\u{1}'),
                Just('\u{2}'),
                Just('\t'),
                Just('é'),
                Just('本'),
                proptest::char::range('a', 'z'),
            ],
            0..8,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    fn arb_grid() -> impl Strategy<Value = Vec<Vec<String>>> {
        (1usize..5, 1usize..5).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(proptest::collection::vec(arb_cell(), cols), rows)
        })
    }

    proptest! {
        #[test]
        fn prop_restore_rows_round_trip(grid in arb_grid()) {
            let mut store = TabularStore::with_columns(grid[0].len());
            for row in &grid {
                store.push_row(row.clone());
            }
            let positions: Vec<usize> = (0..grid.len()).collect();
            let payload = encode_restore_rows(&store, &positions);
            let decoded = decode(&payload).unwrap();
            prop_assert_eq!(decoded, StructuralOp::RestoreRows { positions, rows: grid });
        }

        #[test]
        fn prop_restore_columns_round_trip(grid in arb_grid()) {
            let cols = grid[0].len();
            let mut store = TabularStore::with_columns(cols);
            for row in &grid {
                store.push_row(row.clone());
            }
            let indices: Vec<usize> = (0..cols).collect();
            let payload = encode_restore_columns(&store, &indices);
            match decode(&payload).unwrap() {
                StructuralOp::RestoreColumns { columns, rows } => {
                    prop_assert_eq!(columns.len(), cols);
                    prop_assert_eq!(rows, grid);
                }
                other => prop_assert!(false, "wrong op: {:?}", other),
            }
        }
    }
}
