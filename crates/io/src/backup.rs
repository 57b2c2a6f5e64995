//! Backup rotation on save.
//!
//! `<file>.bak` always holds the most recent prior version. With `keep` > 1,
//! numbered backups `<file>.bak.1 .. <file>.bak.(keep-1)` hold older
//! versions: on each save they shift up by one, the oldest is dropped, and
//! the previous `.bak` becomes `.bak.1`.

use std::path::{Path, PathBuf};

/// Rotate backups for `path` before it is overwritten. `keep` of zero
/// disables rotation; a missing source file is a no-op.
pub fn rotate(path: &Path, keep: usize) -> Result<(), String> {
    if keep == 0 || !path.exists() {
        return Ok(());
    }

    if keep > 1 {
        let oldest = keep - 1;
        let drop = numbered(path, oldest);
        if drop.exists() {
            std::fs::remove_file(&drop).map_err(|e| e.to_string())?;
        }
        for i in (1..oldest).rev() {
            let from = numbered(path, i);
            if from.exists() {
                std::fs::rename(&from, numbered(path, i + 1)).map_err(|e| e.to_string())?;
            }
        }
        let bak = bak_path(path);
        if bak.exists() {
            std::fs::rename(&bak, numbered(path, 1)).map_err(|e| e.to_string())?;
        }
    }

    std::fs::copy(path, bak_path(path)).map_err(|e| e.to_string())?;
    Ok(())
}

fn bak_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".bak");
    PathBuf::from(os)
}

fn numbered(path: &Path, n: usize) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(format!(".bak.{n}"));
    PathBuf::from(os)
}
