pub mod codec;
pub mod commands;
pub mod document;
pub mod history;
pub mod reorder;
pub mod store;
