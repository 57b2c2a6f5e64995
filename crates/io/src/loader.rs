//! Background file loading.
//!
//! Parsing happens on a worker thread while the caller drains progress
//! events; the finished store arrives as the final event. This is a one-shot
//! handoff: each load gets its own channel, there is no cancellation, and a
//! failed load delivers no partial store. De-duplicating loads of an
//! already-open path is the DocumentRegistry's job, not the loader's.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tabgrid_engine::store::TabularStore;

use crate::tsv;

#[derive(Debug)]
pub enum LoadEvent {
    /// Periodic parse progress.
    Progress { rows: usize },
    /// The parsed store; always the last event on success.
    Done(Box<TabularStore>),
    /// Read or parse failure; always the last event on failure.
    Failed(String),
}

/// Start loading `path` on a worker thread. The receiver yields zero or more
/// `Progress` events followed by exactly one `Done` or `Failed`.
pub fn spawn(path: PathBuf) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let content = match tsv::read_file_as_utf8(&path) {
            Ok(content) => content,
            Err(e) => {
                let _ = tx.send(LoadEvent::Failed(e));
                return;
            }
        };
        let result = tsv::parse_with_progress(&content, |rows| {
            let _ = tx.send(LoadEvent::Progress { rows });
        });
        let _ = match result {
            Ok(store) => tx.send(LoadEvent::Done(Box::new(store))),
            Err(e) => tx.send(LoadEvent::Failed(e)),
        };
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_delivers_done_with_parsed_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.tsv");
        fs::write(&path, "A\tB\n1\t2\n").unwrap();

        let rx = spawn(path);
        let mut done = None;
        for event in rx {
            match event {
                LoadEvent::Progress { .. } => {}
                LoadEvent::Done(store) => {
                    done = Some(store);
                    break;
                }
                LoadEvent::Failed(e) => panic!("load failed: {e}"),
            }
        }
        let store = done.expect("no Done event");
        assert_eq!(store.row_count(), 2);
        assert_eq!(store.get(1, 1), Some("2"));
    }

    #[test]
    fn missing_file_delivers_failed() {
        let rx = spawn(PathBuf::from("/nonexistent/nowhere.tsv"));
        match rx.recv().unwrap() {
            LoadEvent::Failed(_) => {}
            other => panic!("expected Failed, got {other:?}"),
        }
        // Channel closes after the terminal event
        assert!(rx.recv().is_err());
    }

    #[test]
    fn progress_precedes_completion_for_large_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.tsv");
        let mut content = String::from("A\n");
        for i in 0..10_000 {
            content.push_str(&format!("{i}\n"));
        }
        fs::write(&path, content).unwrap();

        let events: Vec<LoadEvent> = spawn(path).into_iter().collect();
        assert!(matches!(events.last(), Some(LoadEvent::Done(_))));
        let progress = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::Progress { .. }))
            .count();
        assert!(progress > 0, "expected progress events before Done");
    }
}
