//! Live monitoring client for a simulated microgrid.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod io;
/// Polling, classification, history and shortage accounting.
pub mod monitor;
pub mod offline;
pub mod preference;
pub mod render;
#[cfg(feature = "tui")]
pub mod tui;
