// util.rs

use std::fmt::Display;
use std::io::{ErrorKind, Write};

/// Writes `s` and a newline, treating a closed reader as success.
pub fn writeln_ignore_broken_pipe<W: Write, S: Display>(mut w: W, s: S) -> std::io::Result<()> {
    match writeln!(w, "{}", s) {
        Err(ref e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
