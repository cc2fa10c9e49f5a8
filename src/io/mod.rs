//! File output: history CSV export.

pub mod export;
