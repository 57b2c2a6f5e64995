//! The store-facing command surface.
//!
//! Each mutating command produces exactly one `ChangeRecord`. Invalid
//! selections are rejected with a user-facing message and push nothing;
//! individually bad inputs inside an otherwise valid command (a cell that
//! doesn't parse as a number, a paste line hanging past the table edge) are
//! skipped, never fatal. Freeze and hide commands are view-only and record
//! nothing.

use crate::codec;
use crate::document::Document;
use crate::history::{CellEdit, ChangeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOp {
    fn apply(self, value: f64, operand: f64) -> f64 {
        match self {
            MathOp::Add => value + operand,
            MathOp::Subtract => value - operand,
            MathOp::Multiply => value * operand,
            MathOp::Divide => value / operand,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Subtract => "-",
            MathOp::Multiply => "*",
            MathOp::Divide => "/",
        }
    }
}

impl Document {
    // =========================================================================
    // Cell-level commands
    // =========================================================================

    pub fn edit_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), String> {
        let (Some(previous), Some(logical)) = (
            self.store.get(row, col).map(str::to_string),
            self.store.logical_index(row),
        ) else {
            return Err("Cell is out of range".to_string());
        };
        if previous == value {
            return Ok(());
        }
        self.store.set_cell(row, col, value);
        self.undo.push(
            ChangeRecord::CellEdits(vec![CellEdit { row: logical, col, previous }]),
            "Edit cell",
        );
        self.mark_touched();
        Ok(())
    }

    /// Write a block of tab-separated text starting at the given cell, one
    /// record for the whole block. Lines and fields hanging past the table
    /// edge are clipped.
    pub fn paste_block(&mut self, start_row: usize, start_col: usize, text: &str) -> Result<(), String> {
        if start_row >= self.store.row_count() || start_col >= self.store.column_count() {
            return Err("Paste target is outside the table".to_string());
        }
        let mut edits = Vec::new();
        for (dr, line) in text.lines().enumerate() {
            let row = start_row + dr;
            let Some(logical) = self.store.logical_index(row) else {
                break;
            };
            for (dc, field) in line.split('\t').enumerate() {
                let col = start_col + dc;
                if col >= self.store.column_count() {
                    break;
                }
                let previous = self.store.get(row, col).unwrap_or("").to_string();
                if previous == field {
                    continue;
                }
                self.store.set_cell(row, col, field);
                edits.push(CellEdit { row: logical, col, previous });
            }
        }
        if edits.is_empty() {
            return Ok(());
        }
        self.undo.push(ChangeRecord::CellEdits(edits), "Paste");
        self.mark_touched();
        Ok(())
    }

    /// Blank out every selected cell.
    pub fn delete_selection(&mut self, cells: &[(usize, usize)]) -> Result<(), String> {
        let targets = self.valid_cells(cells);
        if targets.is_empty() {
            return Err("Nothing selected to clear".to_string());
        }
        let mut edits = Vec::new();
        for (row, col) in targets {
            let previous = self.store.get(row, col).unwrap_or("").to_string();
            if previous.is_empty() {
                continue;
            }
            let Some(logical) = self.store.logical_index(row) else {
                continue;
            };
            self.store.set_cell(row, col, "");
            edits.push(CellEdit { row: logical, col, previous });
        }
        if edits.is_empty() {
            return Ok(());
        }
        self.undo.push(ChangeRecord::CellEdits(edits), "Cleared cells");
        self.mark_touched();
        Ok(())
    }

    /// Apply an arithmetic operation to every selected cell whose text
    /// parses as a number; the rest are left untouched.
    pub fn apply_math(&mut self, op: MathOp, operand: f64, cells: &[(usize, usize)]) -> Result<(), String> {
        let targets = self.valid_cells(cells);
        if targets.is_empty() {
            return Err("No cells selected".to_string());
        }
        if op == MathOp::Divide && operand == 0.0 {
            return Err("Cannot divide by zero".to_string());
        }
        let mut edits = Vec::new();
        for (row, col) in targets {
            let previous = self.store.get(row, col).unwrap_or("").to_string();
            let Ok(number) = previous.trim().parse::<f64>() else {
                continue;
            };
            let result = op.apply(number, operand);
            if !result.is_finite() {
                continue;
            }
            let text = format_number(result);
            if text == previous {
                continue;
            }
            let Some(logical) = self.store.logical_index(row) else {
                continue;
            };
            self.store.set_cell(row, col, &text);
            edits.push(CellEdit { row: logical, col, previous });
        }
        if edits.is_empty() {
            return Ok(());
        }
        self.undo.push(
            ChangeRecord::CellEdits(edits),
            format!("Math ({})", op.symbol()),
        );
        self.mark_touched();
        Ok(())
    }

    fn valid_cells(&self, cells: &[(usize, usize)]) -> Vec<(usize, usize)> {
        let mut targets: Vec<(usize, usize)> = cells
            .iter()
            .copied()
            .filter(|&(r, c)| r < self.store.row_count() && c < self.store.column_count())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    // =========================================================================
    // Structural commands
    // =========================================================================

    pub fn add_columns(&mut self, count: usize) -> Result<(), String> {
        if count == 0 {
            return Err("Column count must be positive".to_string());
        }
        let names = self.store.add_columns(count);
        self.push_structural(
            codec::encode_remove_columns(&names),
            format!("Added {} column(s)", count),
        );
        Ok(())
    }

    pub fn insert_columns(&mut self, after: usize, count: usize) -> Result<(), String> {
        if count == 0 {
            return Err("Column count must be positive".to_string());
        }
        let names = self.store.insert_columns(after, count);
        if names.is_empty() {
            return Err("Column is out of range".to_string());
        }
        self.push_structural(
            codec::encode_remove_columns(&names),
            format!("Inserted {} column(s)", count),
        );
        Ok(())
    }

    pub fn remove_columns(&mut self, indices: &[usize]) -> Result<(), String> {
        let mut sane: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.store.column_count())
            .collect();
        sane.sort_unstable();
        sane.dedup();
        if sane.is_empty() {
            return Err("No columns selected".to_string());
        }
        // Snapshot the inverse before the delete destroys the content
        let payload = codec::encode_restore_columns(&self.store, &sane);
        self.store.remove_columns(&sane);
        self.push_structural(payload, format!("Deleted {} column(s)", sane.len()));
        Ok(())
    }

    pub fn clone_columns(&mut self, indices: &[usize], copies: usize) -> Result<(), String> {
        if copies == 0 {
            return Err("Copy count must be positive".to_string());
        }
        let names = self.store.clone_columns(indices, copies);
        if names.is_empty() {
            return Err("No columns selected".to_string());
        }
        self.push_structural(
            codec::encode_remove_columns(&names),
            format!("Cloned {} column(s)", names.len()),
        );
        Ok(())
    }

    pub fn add_rows(&mut self, count: usize) -> Result<(), String> {
        if count == 0 {
            return Err("Row count must be positive".to_string());
        }
        let start = self.store.row_count();
        self.store.add_rows(count);
        self.push_structural(
            codec::encode_remove_rows(start, count),
            format!("Added {} row(s)", count),
        );
        Ok(())
    }

    pub fn insert_rows(&mut self, after: usize, count: usize) -> Result<(), String> {
        if count == 0 {
            return Err("Row count must be positive".to_string());
        }
        if after >= self.store.row_count() {
            return Err("Row is out of range".to_string());
        }
        self.store.insert_rows(after, count);
        self.push_structural(
            codec::encode_remove_rows(after + 1, count),
            format!("Inserted {} row(s)", count),
        );
        Ok(())
    }

    pub fn remove_rows(&mut self, indices: &[usize]) -> Result<(), String> {
        let mut sane: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i != 0 && i < self.store.row_count())
            .collect();
        sane.sort_unstable();
        sane.dedup();
        if sane.is_empty() {
            let message = if indices.contains(&0) {
                "The header row cannot be deleted"
            } else {
                "No rows selected"
            };
            return Err(message.to_string());
        }
        let payload = codec::encode_restore_rows(&self.store, &sane);
        self.store.remove_rows(&sane);
        self.push_structural(payload, format!("Deleted {} row(s)", sane.len()));
        Ok(())
    }

    pub fn clone_rows(&mut self, indices: &[usize], copies: usize) -> Result<(), String> {
        if copies == 0 {
            return Err("Copy count must be positive".to_string());
        }
        let start = self.store.row_count();
        self.store.clone_rows(indices, copies);
        let added = self.store.row_count() - start;
        if added == 0 {
            return Err("No rows selected".to_string());
        }
        self.push_structural(
            codec::encode_remove_rows(start, added),
            format!("Cloned {} row(s)", added),
        );
        Ok(())
    }

    fn push_structural(&mut self, payload: String, label: String) {
        self.undo.push(ChangeRecord::Structural(payload), label);
        self.mark_touched();
    }

    // =========================================================================
    // View-only commands (no ChangeRecord)
    // =========================================================================

    pub fn toggle_freeze_column(&mut self, idx: usize) -> Option<bool> {
        self.reorder.toggle_freeze_column(idx, self.store.column_count())
    }

    pub fn toggle_freeze_row(&mut self, pos: usize) {
        self.reorder.toggle_freeze_row(&mut self.store, pos);
    }

    pub fn hide_columns(&mut self, indices: &[usize]) {
        let count = self.store.column_count();
        self.reorder.hide_columns(indices, count);
    }

    pub fn unhide_columns(&mut self, indices: &[usize]) {
        self.reorder.unhide_columns(indices);
    }

    // =========================================================================
    // Undo
    // =========================================================================

    /// Reverse the most recent command. Returns its history label.
    pub fn undo(&mut self) -> Option<String> {
        self.undo.undo(&mut self.store)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
