// File I/O operations

pub mod backup;
pub mod loader;
pub mod tsv;
