//! Per-file document aggregate and the open-document registry.
//!
//! A `Document` owns everything the editor keeps per open file: the store,
//! its undo history, the freeze/hide state, and dirty tracking. Documents
//! are looked up from a `DocumentRegistry` keyed by normalized path, so
//! opening the same file twice lands on the same document instead of
//! re-parsing it.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::history::UndoEngine;
use crate::reorder::ReorderEngine;
use crate::store::TabularStore;

pub struct Document {
    path: PathBuf,
    pub store: TabularStore,
    pub undo: UndoEngine,
    pub reorder: ReorderEngine,
    /// Fast path for dirty detection: a never-touched document is clean
    /// without comparing content.
    touched: bool,
    saved_snapshot: String,
}

impl Document {
    /// Wrap a freshly loaded store. The document starts clean, with the
    /// current content as its saved snapshot.
    pub fn new(path: PathBuf, store: TabularStore, undo_limit: usize) -> Self {
        let saved_snapshot = store.snapshot();
        Self {
            path,
            store,
            undo: UndoEngine::with_limit(undo_limit),
            reorder: ReorderEngine::new(),
            touched: false,
            saved_snapshot,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dirty means the content differs from the last save — an edit that
    /// was undone back to the saved state reads as clean again.
    pub fn is_dirty(&self) -> bool {
        self.touched && self.store.snapshot() != self.saved_snapshot
    }

    /// Record the just-written content as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved_snapshot = self.store.snapshot();
        self.touched = false;
    }

    pub(crate) fn mark_touched(&mut self) {
        self.touched = true;
    }
}

/// Open documents keyed by normalized path.
#[derive(Default)]
pub struct DocumentRegistry {
    docs: FxHashMap<PathBuf, Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.docs.contains_key(&normalize_path(path))
    }

    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.docs.get(&normalize_path(path))
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Document> {
        self.docs.get_mut(&normalize_path(path))
    }

    /// Register a loaded store under its path and return the document. When
    /// the path is already open the existing document is returned untouched
    /// and the new store is dropped — the second open of a file selects the
    /// first, it does not re-parse.
    pub fn open(&mut self, path: &Path, store: TabularStore, undo_limit: usize) -> &mut Document {
        let key = normalize_path(path);
        self.docs
            .entry(key.clone())
            .or_insert_with(|| Document::new(key, store, undo_limit))
    }

    /// Drop a document and its undo history. Returns false when the path
    /// was not open.
    pub fn close(&mut self, path: &Path) -> bool {
        self.docs.remove(&normalize_path(path)).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.docs.keys().map(PathBuf::as_path)
    }
}

/// Canonicalize when the file exists; otherwise make the path absolute and
/// fold away `.`/`..` components, so two spellings of the same location key
/// the same registry slot.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
