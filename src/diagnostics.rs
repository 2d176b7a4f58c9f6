//! Decode diagnostics
//!
//! The scanner reports everything noteworthy through a `DecodeObserver`
//! instead of logging directly, so the same decode can feed `log`, a test
//! recorder, or nothing at all. Observers only watch: nothing they do can
//! change what is decoded.

use indexmap::IndexMap;
use log::{debug, info};
use std::fmt;

use crate::program_area::ProgramAreaSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// Directory scan finished.
    SlotsLocated { count: usize },
    /// One directory record, reported right after `SlotsLocated`.
    SlotFound { slot: ProgramAreaSlot },
    SlotStarted { number: u8 },
    SlotCompleted { number: u8, programs: usize, fragments: usize },
    /// Line number zero or not above the previous one.
    InvalidLineNumber { address: usize, line_number: u16, previous: u16 },
    /// A terminator turned up before the line's byte count ran out.
    InteriorTerminator { address: usize, line_number: u16 },
    /// A keyword or line reference would have eaten the line terminator.
    TruncatedToken { address: usize, line_number: u16 },
    UnknownOpcode { address: usize, line_number: u16, group: u8, command: u8 },
    UnknownCharacter { address: usize, line_number: u16, byte: u8 },
    /// Statement separator swallowed because `ELSE` follows.
    SeparatorBeforeElse { address: usize, line_number: u16 },
    ProgramCompleted { address: usize, lines: usize },
    FragmentDiscarded { address: usize, lines: usize },
}

impl DecodeEvent {
    /// Progress events are worth showing by default; the rest is detail.
    pub fn is_progress(&self) -> bool {
        matches!(
            self,
            DecodeEvent::SlotsLocated { .. }
                | DecodeEvent::SlotFound { .. }
                | DecodeEvent::SlotStarted { .. }
                | DecodeEvent::SlotCompleted { .. }
        )
    }
}

impl fmt::Display for DecodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeEvent::SlotsLocated { count } => write!(f, "Found {} Program Areas.", count),
            DecodeEvent::SlotFound { slot } => write!(f, "Program Area {}.", slot),
            DecodeEvent::SlotStarted { number } => write!(f, "DeTokenizing P{}...", number),
            DecodeEvent::SlotCompleted {
                number,
                programs,
                fragments,
            } => write!(
                f,
                "DeTokenizing P{} completed: {} program(s), {} fragment(s) discarded.",
                number, programs, fragments
            ),
            DecodeEvent::InvalidLineNumber {
                address,
                line_number,
                previous,
            } => write!(
                f,
                "{:X} line {}: not above previous line {}, buffer discarded.",
                address, line_number, previous
            ),
            DecodeEvent::InteriorTerminator {
                address,
                line_number,
            } => write!(
                f,
                "{:X} line {}: null byte found with bytes remaining in current line.  Invalid BASIC line.",
                address, line_number
            ),
            DecodeEvent::TruncatedToken {
                address,
                line_number,
            } => write!(
                f,
                "{:X} line {}: token runs past the end of the line.  Invalid BASIC line.",
                address, line_number
            ),
            DecodeEvent::UnknownOpcode {
                address,
                line_number,
                group,
                command,
            } => write!(
                f,
                "{:X} line {}: unknown token {:X} {:X}.",
                address, line_number, command, group
            ),
            DecodeEvent::UnknownCharacter {
                address,
                line_number,
                byte,
            } => write!(f, "{:X} line {}: unknown byte {:X}.", address, line_number, byte),
            DecodeEvent::SeparatorBeforeElse {
                address,
                line_number,
            } => write!(
                f,
                "{:X} line {}: multi-statement marker found before 'ELSE', ignored.",
                address, line_number
            ),
            DecodeEvent::ProgramCompleted { address, lines } => {
                write!(f, "{:X}: program completed with {} line(s).", address, lines)
            }
            DecodeEvent::FragmentDiscarded { address, lines } => {
                write!(f, "{:X}: fragment of {} line(s) discarded.", address, lines)
            }
        }
    }
}

pub trait DecodeObserver {
    fn on_event(&mut self, event: &DecodeEvent);
}

/// Forwards progress at `info` and everything else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl DecodeObserver for LogObserver {
    fn on_event(&mut self, event: &DecodeEvent) {
        if event.is_progress() {
            info!("{}", event);
        } else {
            debug!("{}", event);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl DecodeObserver for NullObserver {
    fn on_event(&mut self, _event: &DecodeEvent) {}
}

/// Keeps every event, in order.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    pub events: Vec<DecodeEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_where(&self, pred: impl Fn(&DecodeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl DecodeObserver for EventRecorder {
    fn on_event(&mut self, event: &DecodeEvent) {
        self.events.push(event.clone());
    }
}

impl<T: DecodeObserver + ?Sized> DecodeObserver for &mut T {
    fn on_event(&mut self, event: &DecodeEvent) {
        (**self).on_event(event);
    }
}

impl<A: DecodeObserver, B: DecodeObserver> DecodeObserver for (A, B) {
    fn on_event(&mut self, event: &DecodeEvent) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOpcodeStats {
    pub count: usize,
    pub first_address: usize,
    pub first_line: u16,
}

/// Summary of unknown `(group, command)` pairs, in order of first sighting.
#[derive(Debug, Default, Clone)]
pub struct UnknownOpcodeReport {
    pub opcodes: IndexMap<(u8, u8), UnknownOpcodeStats>,
}

impl UnknownOpcodeReport {
    pub fn from_events(events: &[DecodeEvent]) -> Self {
        let mut opcodes: IndexMap<(u8, u8), UnknownOpcodeStats> = IndexMap::new();
        for event in events {
            if let DecodeEvent::UnknownOpcode {
                address,
                line_number,
                group,
                command,
            } = *event
            {
                opcodes
                    .entry((group, command))
                    .and_modify(|s| s.count += 1)
                    .or_insert(UnknownOpcodeStats {
                        count: 1,
                        first_address: address,
                        first_line: line_number,
                    });
            }
        }
        UnknownOpcodeReport { opcodes }
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }
}

impl fmt::Display for UnknownOpcodeReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ((group, command), stats) in &self.opcodes {
            writeln!(
                f,
                "{{{:X} {:X}}}: {} occurrence(s), first at {:04X} in line {}",
                command, group, stats.count, stats.first_address, stats.first_line
            )?;
        }
        Ok(())
    }
}
