// TSV import/export

use std::io::Read;
use std::path::Path;

use tabgrid_engine::store::TabularStore;

use crate::backup;

pub fn load(path: &Path) -> Result<TabularStore, String> {
    let content = read_file_as_utf8(path)?;
    parse_str(&content)
}

pub fn parse_str(content: &str) -> Result<TabularStore, String> {
    parse_with_progress(content, |_| {})
}

/// Parse tab-delimited text into a store. The first physical line seeds the
/// column count and row 0; later lines are padded or truncated to fit.
/// `progress` is invoked periodically with the number of rows parsed so far.
pub fn parse_with_progress(
    content: &str,
    mut progress: impl FnMut(usize),
) -> Result<TabularStore, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes());

    const PROGRESS_EVERY: usize = 4096;

    let mut store = TabularStore::default();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if i == 0 {
            store = TabularStore::with_columns(record.len().max(1));
        }
        store.push_row(record.iter().map(str::to_string).collect());
        if (i + 1) % PROGRESS_EVERY == 0 {
            progress(i + 1);
        }
    }
    store.sync_header_from_row0();
    Ok(store)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for legacy exports)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Write the store back to disk, rotating backups first when `backup_count`
/// is non-zero. The written content is `store.snapshot()`: one line per row,
/// fields joined by tabs, the hidden logical index excluded.
pub fn save(store: &TabularStore, path: &Path, backup_count: usize) -> Result<(), String> {
    backup::rotate(path, backup_count)?;
    std::fs::write(path, store.snapshot()).map_err(|e| e.to_string())
}
