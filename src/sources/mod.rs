//! Definition sources: structured INI files and per-item text files

pub mod flat;
pub mod structured;

pub use flat::{FileSelector, FlatFileSource};
pub use structured::IniSource;
