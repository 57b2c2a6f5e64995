//! Undo history.
//!
//! One `ChangeRecord` per user action, reversed strictly LIFO. There is no
//! redo stack: a popped record is gone. A parallel label list (always the
//! same length as the stack) gives the UI a human-readable history.

use crate::codec::{self, StructuralOp};
use crate::store::TabularStore;

/// A single reversible cell write. The row is keyed by its logical index at
/// edit time rather than its position: freezing physically reorders storage
/// but never touches logical indices, so the record still finds the right
/// row after an intervening freeze/unfreeze.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row: u32,
    pub col: usize,
    pub previous: String,
}

/// One reversible user action.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    /// A cell edit, paste, math application, or selection clear.
    CellEdits(Vec<CellEdit>),
    /// A structural change, carried as one codec payload.
    Structural(String),
}

#[derive(Debug, Default)]
pub struct UndoEngine {
    undo_stack: Vec<ChangeRecord>,
    labels: Vec<String>,
    /// Maximum entries kept; 0 means unlimited.
    limit: usize,
    /// Set for the duration of a replay. While set, no new record may be
    /// pushed: reversing cell writes must not record themselves as edits.
    replaying: bool,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Record one action. Rejected (returning false, stack unchanged) while
    /// a replay is in progress, and for empty cell-edit lists.
    pub fn push(&mut self, record: ChangeRecord, label: impl Into<String>) -> bool {
        if self.replaying {
            return false;
        }
        if matches!(&record, ChangeRecord::CellEdits(edits) if edits.is_empty()) {
            return false;
        }
        self.undo_stack.push(record);
        self.labels.push(label.into());
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
            self.labels.remove(0);
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Pop the most recent record and reverse it against the store. Returns
    /// the undone action's label, or `None` when there is nothing to undo or
    /// a replay is already running.
    pub fn undo(&mut self, store: &mut TabularStore) -> Option<String> {
        if self.replaying {
            return None;
        }
        let record = self.undo_stack.pop()?;
        let label = self.labels.pop().unwrap_or_default();

        self.replaying = true;
        match record {
            ChangeRecord::CellEdits(edits) => {
                // Reverse order, in case one action wrote a cell twice
                for edit in edits.iter().rev() {
                    if let Some(pos) = store.position_of_logical(edit.row) {
                        store.set_cell(pos, edit.col, &edit.previous);
                    }
                }
            }
            ChangeRecord::Structural(payload) => {
                // A malformed payload is skipped, leaving the store as-is
                if let Some(op) = codec::decode(&payload) {
                    apply_structural(store, op);
                }
            }
        }
        self.replaying = false;

        Some(label)
    }
}

fn apply_structural(store: &mut TabularStore, op: StructuralOp) {
    match op {
        StructuralOp::RemoveColumns { names } => store.remove_columns_by_name(&names),
        StructuralOp::RemoveRows { start, count } => store.remove_row_range(start, count),
        StructuralOp::RestoreColumns { columns, rows } => store.restore_columns(&columns, &rows),
        StructuralOp::RestoreRows { positions, rows } => store.restore_rows(&positions, &rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reorder::ReorderEngine;

    fn store_3x3() -> TabularStore {
        let mut store = TabularStore::with_columns(3);
        store.push_row(vec!["A".into(), "B".into(), "C".into()]);
        store.push_row(vec!["1".into(), "2".into(), "3".into()]);
        store.push_row(vec!["4".into(), "5".into(), "6".into()]);
        store.sync_header_from_row0();
        store
    }

    #[test]
    fn undo_restores_previous_cell_value() {
        let mut store = store_3x3();
        let mut undo = UndoEngine::new();

        let prev = store.get(1, 1).unwrap().to_string();
        store.set_cell(1, 1, "edited");
        undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: 1, col: 1, previous: prev }]),
            "Edit cell",
        );

        assert_eq!(undo.undo(&mut store), Some("Edit cell".to_string()));
        assert_eq!(store.get(1, 1), Some("2"));
        assert!(!undo.can_undo());
    }

    #[test]
    fn undo_cell_edit_after_row_freeze() {
        let mut store = store_3x3();
        let mut reorder = ReorderEngine::new();
        let mut undo = UndoEngine::new();

        // Edit the row currently at position 2 (logical index 2)
        let prev = store.get(2, 0).unwrap().to_string();
        store.set_cell(2, 0, "edited");
        undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: 2, col: 0, previous: prev }]),
            "Edit cell",
        );

        // Freeze moves that row to position 1
        reorder.toggle_freeze_row(&mut store, 2);
        assert_eq!(store.get(1, 0), Some("edited"));

        undo.undo(&mut store);
        assert_eq!(store.get(1, 0), Some("4"));
    }

    #[test]
    fn undo_row0_edit_resyncs_header() {
        let mut store = store_3x3();
        let mut undo = UndoEngine::new();

        let prev = store.get(0, 0).unwrap().to_string();
        store.set_cell(0, 0, "New");
        undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: 0, col: 0, previous: prev }]),
            "Edit cell",
        );
        assert_eq!(store.columns()[0].header(), "New");

        undo.undo(&mut store);
        assert_eq!(store.columns()[0].header(), "A");
    }

    #[test]
    fn undo_structural_restore_rows() {
        let mut store = store_3x3();
        let mut undo = UndoEngine::new();

        let payload = codec::encode_restore_rows(&store, &[1]);
        store.remove_rows(&[1]);
        undo.push(ChangeRecord::Structural(payload), "Deleted 1 row(s)");
        assert_eq!(store.row_count(), 2);

        undo.undo(&mut store);
        assert_eq!(store.row_count(), 3);
        assert_eq!(store.get(1, 0), Some("1"));
        let logical: Vec<u32> = store.rows().iter().map(|r| r.logical()).collect();
        assert_eq!(logical, vec![0, 1, 2]);
    }

    #[test]
    fn malformed_payload_is_a_noop_undo() {
        let mut store = store_3x3();
        let mut undo = UndoEngine::new();
        undo.push(ChangeRecord::Structural("RESTORE_ROWS:garbage".into()), "Broken");

        let before = store.clone();
        assert_eq!(undo.undo(&mut store), Some("Broken".to_string()));
        assert_eq!(store, before);
        assert_eq!(undo.len(), 0);
    }

    #[test]
    fn push_is_rejected_mid_replay() {
        let mut undo = UndoEngine::new();
        undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: 1, col: 0, previous: "x".into() }]),
            "Edit cell",
        );

        undo.replaying = true;
        let pushed = undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: 2, col: 0, previous: "y".into() }]),
            "Edit cell",
        );
        assert!(!pushed);
        assert_eq!(undo.len(), 1);
        assert_eq!(undo.labels().len(), 1);
        undo.replaying = false;

        // A completed undo removes exactly one entry
        let mut store = store_3x3();
        undo.undo(&mut store);
        assert_eq!(undo.len(), 0);
    }

    #[test]
    fn limit_evicts_oldest_entry_and_label() {
        let mut undo = UndoEngine::with_limit(2);
        for i in 0..3 {
            undo.push(
                ChangeRecord::CellEdits(vec![CellEdit { row: 1, col: i, previous: "p".into() }]),
                format!("edit {i}"),
            );
        }
        assert_eq!(undo.len(), 2);
        assert_eq!(undo.labels(), &["edit 1".to_string(), "edit 2".to_string()]);
    }

    #[test]
    fn empty_cell_edit_record_is_rejected() {
        let mut undo = UndoEngine::new();
        assert!(!undo.push(ChangeRecord::CellEdits(Vec::new()), "nothing"));
        assert!(undo.is_empty());
    }
}
