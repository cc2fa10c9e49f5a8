//! Audible alert cue played on shortage.

use std::io::{self, Write};

/// Something that can signal a shortage to the operator.
///
/// Playback is best effort: the dashboard logs and discards any error.
pub trait AlertCue: Send {
    /// Attempts to play the cue once.
    fn play(&mut self) -> io::Result<()>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AlertCue for TerminalBell {
    fn play(&mut self) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()
    }
}

/// A cue that does nothing.
#[derive(Debug, Default)]
pub struct Silent;

impl AlertCue for Silent {
    fn play(&mut self) -> io::Result<()> {
        Ok(())
    }
}
