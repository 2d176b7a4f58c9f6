//! Program recovery state
//!
//! Lines accumulate in a buffer until the scanner sees an end-of-program
//! marker, at which point the buffer becomes a program. Anything that breaks
//! the line sequence (a number that does not increase, a malformed line)
//! throws the whole buffer away as a fragment: one bad line means the lines
//! before it cannot be trusted to belong to the same program either.
//!
//! Invariant: the buffer is empty exactly when `last_line_number` is 0.

use crate::listing::{DecodedProgram, DiscardedFragment, Line};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub programs: Vec<DecodedProgram>,
    pub fragments: Vec<DiscardedFragment>,
}

#[derive(Debug, Default)]
pub struct RecoveryManager {
    buffer: Vec<Line>,
    last_line_number: u16,
    completed: Vec<DecodedProgram>,
    discarded: Vec<DiscardedFragment>,
}

impl RecoveryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_line_number(&self) -> u16 {
        self.last_line_number
    }

    pub fn buffered_lines(&self) -> usize {
        self.buffer.len()
    }

    /// First line address of the buffered program, if any.
    pub fn buffer_address(&self) -> Option<usize> {
        self.buffer.first().map(|l| l.address)
    }

    /// Would a line with this number continue the current program?
    pub fn admits(&self, number: u16) -> bool {
        number != 0 && number > self.last_line_number
    }

    /// Append a fully decoded line. A line that does not continue the
    /// sequence discards the buffer instead and is dropped.
    pub fn accept_line(&mut self, line: Line) -> bool {
        if !self.admits(line.number) {
            self.discard_buffer();
            return false;
        }
        self.last_line_number = line.number;
        self.buffer.push(line);
        true
    }

    /// Discard the buffer together with a line that failed part way
    /// through decoding. Returns the number of complete lines thrown away.
    pub fn abandon_line(&mut self, partial: Line) -> usize {
        let lines = std::mem::take(&mut self.buffer);
        let count = lines.len();
        self.discarded.push(DiscardedFragment {
            lines,
            partial: Some(partial),
        });
        self.last_line_number = 0;
        count
    }

    /// Promote the buffer to a finished program. Returns its line count, or
    /// `None` when there was nothing buffered.
    pub fn complete_program(&mut self) -> Option<usize> {
        self.last_line_number = 0;
        if self.buffer.is_empty() {
            return None;
        }
        let lines = std::mem::take(&mut self.buffer);
        let count = lines.len();
        self.completed.push(DecodedProgram { lines });
        Some(count)
    }

    /// Demote the buffer to a fragment. Returns its line count, or `None`
    /// when there was nothing buffered.
    pub fn discard_buffer(&mut self) -> Option<usize> {
        self.last_line_number = 0;
        if self.buffer.is_empty() {
            return None;
        }
        let lines = std::mem::take(&mut self.buffer);
        let count = lines.len();
        self.discarded.push(DiscardedFragment {
            lines,
            partial: None,
        });
        Some(count)
    }

    /// End of the scanned range: leftovers never count as a program.
    pub fn finish(mut self) -> ScanResult {
        self.discard_buffer();
        ScanResult {
            programs: self.completed,
            fragments: self.discarded,
        }
    }
}
