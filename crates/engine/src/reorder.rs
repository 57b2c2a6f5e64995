//! Freeze and hide reordering.
//!
//! Columns and rows freeze differently. Freezing a column only changes the
//! display order; storage is untouched. Freezing a row physically rebuilds
//! row storage (header first, frozen rows next, the rest in their prior
//! relative order) and "frozen" afterwards means "occupies one of the first
//! k positions" — a contiguous range, not a tag on particular rows. Logical
//! indices are never touched here, which is what makes unfreeze-all able to
//! restore the pre-freeze order by sorting on them.

use rustc_hash::FxHashSet;

use crate::store::TabularStore;

#[derive(Debug, Default)]
pub struct ReorderEngine {
    frozen_cols: FxHashSet<usize>,
    hidden_cols: FxHashSet<usize>,
    /// Row 0 is only part of the frozen block when explicitly locked.
    row0_locked: bool,
    /// Frozen rows other than row 0.
    locked_count: usize,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Columns (display-order only)
    // =========================================================================

    /// Toggle a column's frozen state. Returns the new state, or `None` for
    /// an out-of-range index.
    pub fn toggle_freeze_column(&mut self, idx: usize, column_count: usize) -> Option<bool> {
        if idx >= column_count {
            return None;
        }
        if self.frozen_cols.remove(&idx) {
            Some(false)
        } else {
            self.frozen_cols.insert(idx);
            Some(true)
        }
    }

    pub fn is_column_frozen(&self, idx: usize) -> bool {
        self.frozen_cols.contains(&idx)
    }

    pub fn hide_columns(&mut self, indices: &[usize], column_count: usize) {
        for &idx in indices {
            if idx < column_count {
                self.hidden_cols.insert(idx);
            }
        }
    }

    pub fn unhide_columns(&mut self, indices: &[usize]) {
        for idx in indices {
            self.hidden_cols.remove(idx);
        }
    }

    pub fn is_column_hidden(&self, idx: usize) -> bool {
        self.hidden_cols.contains(&idx)
    }

    /// Storage indices in display order: frozen columns first in ascending
    /// storage order, then the rest in ascending storage order, hidden
    /// columns omitted.
    pub fn column_display_order(&self, column_count: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..column_count)
            .filter(|i| self.frozen_cols.contains(i) && !self.hidden_cols.contains(i))
            .collect();
        order.extend(
            (0..column_count)
                .filter(|i| !self.frozen_cols.contains(i) && !self.hidden_cols.contains(i)),
        );
        order
    }

    /// Display ordinal of a storage column, `None` when hidden or out of
    /// range.
    pub fn column_display_ordinal(&self, idx: usize, column_count: usize) -> Option<usize> {
        self.column_display_order(column_count)
            .iter()
            .position(|&i| i == idx)
    }

    // =========================================================================
    // Rows (physical reorder)
    // =========================================================================

    /// Currently frozen positions as `(start, count)`.
    pub fn frozen_row_range(&self) -> (usize, usize) {
        if self.row0_locked {
            (0, self.locked_count + 1)
        } else {
            (1, self.locked_count)
        }
    }

    pub fn is_row_frozen(&self, pos: usize) -> bool {
        let (start, count) = self.frozen_row_range();
        pos >= start && pos < start + count
    }

    pub fn any_rows_frozen(&self) -> bool {
        self.row0_locked || self.locked_count > 0
    }

    /// Toggle the frozen state of the row currently at `pos`, rebuilding
    /// storage. When the last row is unfrozen, the pre-freeze order comes
    /// back by sorting on logical indices.
    pub fn toggle_freeze_row(&mut self, store: &mut TabularStore, pos: usize) {
        let row_count = store.row_count();
        if pos >= row_count {
            return;
        }

        // Current frozen block, with positions stale after removals dropped
        let (start, count) = self.frozen_row_range();
        let mut frozen: Vec<usize> = (start..(start + count).min(row_count)).collect();

        if let Some(at) = frozen.iter().position(|&p| p == pos) {
            frozen.remove(at);
        } else {
            frozen.push(pos);
        }

        let row0 = frozen.contains(&0);
        let mut others: Vec<usize> = frozen.into_iter().filter(|&p| p != 0).collect();
        others.sort_unstable();

        if !row0 && others.is_empty() {
            self.row0_locked = false;
            self.locked_count = 0;
            store.sort_rows_by_logical();
            return;
        }

        // Header first, frozen rows ascending, the rest in prior relative order
        let mut order = Vec::with_capacity(row_count);
        order.push(0);
        order.extend(&others);
        order.extend((1..row_count).filter(|p| !others.contains(p)));
        store.reorder_rows(&order);

        self.row0_locked = row0;
        self.locked_count = others.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_rows(n: usize) -> TabularStore {
        let mut store = TabularStore::with_columns(1);
        store.push_row(vec!["H".into()]);
        for i in 1..n {
            store.push_row(vec![format!("r{i}")]);
        }
        store.sync_header_from_row0();
        store
    }

    fn first_cells(store: &TabularStore) -> Vec<String> {
        store.rows().iter().map(|r| r.cells()[0].clone()).collect()
    }

    #[test]
    fn column_freeze_reorders_display_only() {
        let mut eng = ReorderEngine::new();
        assert_eq!(eng.toggle_freeze_column(3, 5), Some(true));
        assert_eq!(eng.column_display_order(5), vec![3, 0, 1, 2, 4]);
        assert_eq!(eng.column_display_ordinal(3, 5), Some(0));
        assert_eq!(eng.column_display_ordinal(0, 5), Some(1));

        assert_eq!(eng.toggle_freeze_column(3, 5), Some(false));
        assert_eq!(eng.column_display_order(5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn column_freeze_out_of_range_is_rejected() {
        let mut eng = ReorderEngine::new();
        assert_eq!(eng.toggle_freeze_column(9, 5), None);
        assert_eq!(eng.column_display_order(5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn hidden_columns_leave_display_order() {
        let mut eng = ReorderEngine::new();
        eng.hide_columns(&[1, 4, 99], 5);
        assert_eq!(eng.column_display_order(5), vec![0, 2, 3]);
        assert_eq!(eng.column_display_ordinal(1, 5), None);

        eng.unhide_columns(&[1]);
        assert_eq!(eng.column_display_order(5), vec![0, 1, 2, 3]);
    }

    #[test]
    fn freeze_rows_moves_them_below_header() {
        let mut store = store_with_rows(5);
        let mut eng = ReorderEngine::new();

        eng.toggle_freeze_row(&mut store, 2);
        eng.toggle_freeze_row(&mut store, 4);

        assert_eq!(first_cells(&store), vec!["H", "r2", "r4", "r1", "r3"]);
        assert_eq!(eng.frozen_row_range(), (1, 2));
        assert!(eng.is_row_frozen(1));
        assert!(eng.is_row_frozen(2));
        assert!(!eng.is_row_frozen(3));
    }

    #[test]
    fn unfreeze_all_restores_prefreeze_order() {
        let mut store = store_with_rows(5);
        let mut eng = ReorderEngine::new();

        eng.toggle_freeze_row(&mut store, 2);
        eng.toggle_freeze_row(&mut store, 4);
        // Unfreeze the whole block (positions 1 and 2 after the rebuild)
        eng.toggle_freeze_row(&mut store, 1);
        eng.toggle_freeze_row(&mut store, 1);

        assert!(!eng.any_rows_frozen());
        assert_eq!(first_cells(&store), vec!["H", "r1", "r2", "r3", "r4"]);
        let logical: Vec<u32> = store.rows().iter().map(|r| r.logical()).collect();
        assert_eq!(logical, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn header_stays_first_unless_explicitly_locked() {
        let mut store = store_with_rows(4);
        let mut eng = ReorderEngine::new();

        eng.toggle_freeze_row(&mut store, 3);
        assert_eq!(first_cells(&store)[0], "H");
        assert!(!eng.is_row_frozen(0));

        eng.toggle_freeze_row(&mut store, 0);
        assert_eq!(eng.frozen_row_range(), (0, 2));
        assert!(eng.is_row_frozen(0));
        assert_eq!(first_cells(&store)[0], "H");
    }

    #[test]
    fn freeze_ignores_out_of_range_position() {
        let mut store = store_with_rows(3);
        let mut eng = ReorderEngine::new();
        eng.toggle_freeze_row(&mut store, 17);
        assert!(!eng.any_rows_frozen());
        assert_eq!(first_cells(&store), vec!["H", "r1", "r2"]);
    }
}
