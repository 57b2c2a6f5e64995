/// A single column: a stable internal name plus the display header text
/// mirrored from row 0. The internal name is never shown to the user and
/// never reused within one store, so an undo payload can refer to a column
/// unambiguously even after later inserts and removals.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    header: String,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

/// One row of cell text, parallel to the store's column list.
///
/// `logical` is the hidden ordering index: unique per store, equal to the
/// position order when no freeze is active, renumbered contiguous after any
/// row removal. It is a value to compare and sort on, not a persistent ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    logical: u32,
    cells: Vec<String>,
}

impl Row {
    pub fn logical(&self) -> u32 {
        self.logical
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// In-memory grid for one open tab-delimited file.
///
/// Row 0 is the editable header row and is always physically first. All
/// mutation primitives validate their inputs and turn out-of-range or
/// zero-count requests into no-ops instead of errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularStore {
    columns: Vec<Column>,
    rows: Vec<Row>,
    next_col_id: u64,
}

impl TabularStore {
    /// Create an empty store with `count` columns and no rows.
    pub fn with_columns(count: usize) -> Self {
        let mut store = Self::default();
        store.add_columns(count);
        store
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.cells.get(col)).map(String::as_str)
    }

    /// Set a cell's text. Returns false (and leaves the store untouched) when
    /// the coordinates are out of range. A write into row 0 updates that
    /// column's display header as well, keeping the header mirror current.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> bool {
        if row >= self.rows.len() || col >= self.columns.len() {
            return false;
        }
        self.rows[row].cells[col] = value.to_string();
        if row == 0 {
            self.columns[col].header = value.to_string();
        }
        true
    }

    pub fn logical_index(&self, row: usize) -> Option<u32> {
        self.rows.get(row).map(|r| r.logical)
    }

    /// Find the current position of the row carrying a logical index.
    pub fn position_of_logical(&self, logical: u32) -> Option<usize> {
        self.rows.iter().position(|r| r.logical == logical)
    }

    fn fresh_column_name(&mut self) -> String {
        self.next_col_id += 1;
        format!("Col{}", self.next_col_id)
    }

    fn max_logical(&self) -> Option<u32> {
        self.rows.iter().map(|r| r.logical).max()
    }

    fn renumber_logical(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.logical = i as u32;
        }
    }

    // =========================================================================
    // Column operations
    // =========================================================================

    /// Append `count` columns with empty cells. Returns the generated
    /// internal names (empty when `count` is zero).
    pub fn add_columns(&mut self, count: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            let name = self.fresh_column_name();
            names.push(name.clone());
            self.columns.push(Column { name, header: String::new() });
            for row in &mut self.rows {
                row.cells.push(String::new());
            }
        }
        names
    }

    /// Splice `count` columns immediately after ordinal `after`, shifting
    /// later columns right. Out-of-range `after` is a no-op.
    pub fn insert_columns(&mut self, after: usize, count: usize) -> Vec<String> {
        if count == 0 || after >= self.columns.len() {
            return Vec::new();
        }
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            let name = self.fresh_column_name();
            names.push(name.clone());
            let at = after + 1 + i;
            self.columns.insert(at, Column { name, header: String::new() });
            for row in &mut self.rows {
                row.cells.insert(at, String::new());
            }
        }
        names
    }

    /// Delete columns by index. The caller is responsible for snapshotting a
    /// restore payload first; this only mutates.
    pub fn remove_columns(&mut self, indices: &[usize]) {
        let mut sane = self.sanitize_col_indices(indices);
        sane.reverse();
        for idx in sane {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.cells.remove(idx);
            }
        }
    }

    /// Delete columns by internal name. Unknown names are skipped. This is
    /// the undo path for add/insert/clone-columns.
    pub fn remove_columns_by_name(&mut self, names: &[String]) {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.columns.iter().position(|c| &c.name == n))
            .collect();
        self.remove_columns(&indices);
    }

    /// For each copy, for each selected column in ascending index order,
    /// append a new column holding every row's value from the source.
    pub fn clone_columns(&mut self, indices: &[usize], copies: usize) -> Vec<String> {
        let sane = self.sanitize_col_indices(indices);
        if sane.is_empty() || copies == 0 {
            return Vec::new();
        }
        let mut names = Vec::with_capacity(sane.len() * copies);
        for _ in 0..copies {
            for &src in &sane {
                let name = self.fresh_column_name();
                names.push(name.clone());
                self.columns.push(Column {
                    name,
                    header: self.columns[src].header.clone(),
                });
                for row in &mut self.rows {
                    let value = row.cells[src].clone();
                    row.cells.push(value);
                }
            }
        }
        names
    }

    /// Re-create removed columns from an undo snapshot: one `(ordinal, name)`
    /// pair per column, plus per-row values for those columns only. Ordinals
    /// are clamped to the current column count.
    pub fn restore_columns(&mut self, columns: &[(usize, String)], row_values: &[Vec<String>]) {
        for (k, (ordinal, name)) in columns.iter().enumerate() {
            let at = (*ordinal).min(self.columns.len());
            self.columns.insert(at, Column { name: name.clone(), header: String::new() });
            for (i, row) in self.rows.iter_mut().enumerate() {
                let value = row_values
                    .get(i)
                    .and_then(|vals| vals.get(k))
                    .cloned()
                    .unwrap_or_default();
                row.cells.insert(at, value);
            }
        }
        self.sync_header_from_row0();
    }

    fn sanitize_col_indices(&self, indices: &[usize]) -> Vec<usize> {
        let mut sane: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.columns.len())
            .collect();
        sane.sort_unstable();
        sane.dedup();
        sane
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    /// Append `count` blank rows, logical indices continuing from the
    /// current maximum.
    pub fn add_rows(&mut self, count: usize) {
        let mut next = self.max_logical().map_or(0, |m| m + 1);
        for _ in 0..count {
            self.rows.push(Row {
                logical: next,
                cells: vec![String::new(); self.columns.len()],
            });
            next += 1;
        }
    }

    /// Insert `count` blank rows immediately after position `after`. Rows
    /// past the insertion point have their logical index shifted by `count`
    /// and the new rows take the vacated indices, keeping logical order
    /// monotonic with position.
    pub fn insert_rows(&mut self, after: usize, count: usize) {
        if count == 0 || after >= self.rows.len() {
            return;
        }
        let shift = count as u32;
        for row in &mut self.rows[after + 1..] {
            row.logical += shift;
        }
        let base = self.rows[after].logical;
        for i in 0..count {
            self.rows.insert(
                after + 1 + i,
                Row {
                    logical: base + 1 + i as u32,
                    cells: vec![String::new(); self.columns.len()],
                },
            );
        }
    }

    /// Delete rows by position, then renumber logical indices `0..N-1` in
    /// position order. Row 0 (the header row) is never removed.
    pub fn remove_rows(&mut self, indices: &[usize]) {
        let mut sane: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i != 0 && i < self.rows.len())
            .collect();
        sane.sort_unstable();
        sane.dedup();
        if sane.is_empty() {
            return;
        }
        for idx in sane.into_iter().rev() {
            self.rows.remove(idx);
        }
        self.renumber_logical();
    }

    /// Delete a contiguous row range, then renumber. This is the undo path
    /// for add/insert/clone-rows; the range is clamped to protect row 0 and
    /// the table bounds.
    pub fn remove_row_range(&mut self, start: usize, count: usize) {
        let start = start.max(1);
        if count == 0 || start >= self.rows.len() {
            return;
        }
        let end = (start + count).min(self.rows.len());
        self.rows.drain(start..end);
        self.renumber_logical();
    }

    /// Re-insert removed rows from an undo snapshot at their original
    /// positions (clamped to the current bounds), then renumber.
    pub fn restore_rows(&mut self, positions: &[usize], row_values: &[Vec<String>]) {
        let mut entries: Vec<(usize, &Vec<String>)> = positions
            .iter()
            .copied()
            .zip(row_values.iter())
            .collect();
        entries.sort_by_key(|(pos, _)| *pos);
        for (pos, values) in entries {
            let mut cells = values.clone();
            cells.resize(self.columns.len(), String::new());
            cells.truncate(self.columns.len());
            let at = pos.max(1).min(self.rows.len());
            self.rows.insert(at, Row { logical: 0, cells });
        }
        self.renumber_logical();
    }

    /// Append a clone of each selected row, `copies` times over. Clones get
    /// fresh logical indices; values are copied verbatim.
    pub fn clone_rows(&mut self, indices: &[usize], copies: usize) {
        let mut sane: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.rows.len())
            .collect();
        sane.sort_unstable();
        sane.dedup();
        if sane.is_empty() || copies == 0 {
            return;
        }
        let mut next = self.max_logical().map_or(0, |m| m + 1);
        for _ in 0..copies {
            for &src in &sane {
                let cells = self.rows[src].cells.clone();
                self.rows.push(Row { logical: next, cells });
                next += 1;
            }
        }
    }

    /// Used by the loader: append a parsed row, padded or truncated to the
    /// current column count, logical index equal to its position.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        cells.truncate(self.columns.len());
        self.rows.push(Row {
            logical: self.rows.len() as u32,
            cells,
        });
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Physically rebuild row storage in the given position order. The order
    /// must be a permutation of `0..row_count`; anything else is a no-op.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        if order.len() != self.rows.len() {
            return;
        }
        let mut seen = vec![false; self.rows.len()];
        for &i in order {
            if i >= self.rows.len() || seen[i] {
                return;
            }
            seen[i] = true;
        }
        let mut slots: Vec<Option<Row>> = std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        self.rows = order.iter().filter_map(|&i| slots[i].take()).collect();
    }

    /// Restore pre-freeze order: stable sort by logical index ascending.
    /// Row 0 sorts first because its logical index is minimal.
    pub fn sort_rows_by_logical(&mut self) {
        self.rows.sort_by_key(|r| r.logical);
    }

    // =========================================================================
    // Header mirror and serialization
    // =========================================================================

    /// Mirror row 0's text into each column's display header.
    pub fn sync_header_from_row0(&mut self) {
        for (i, col) in self.columns.iter_mut().enumerate() {
            col.header = self
                .rows
                .first()
                .and_then(|r| r.cells.get(i))
                .cloned()
                .unwrap_or_default();
        }
    }

    /// The exact on-disk content: one line per row, fields joined by tabs,
    /// logical indices excluded. Also the identity compared for dirty
    /// detection.
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                if i > 0 {
                    out.push('\t');
                }
                out.push_str(cell);
            }
            out.push('\n');
        }
        out
    }
}
