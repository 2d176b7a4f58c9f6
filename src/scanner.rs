//! Line scanner
//!
//! There is no directory of lines and no checksum, so every byte offset is
//! tried as the start of a stored line:
//!
//! ```text
//! +0       count C: offset of the terminator from this byte
//! +1 +2    line number, low byte first
//! +3       0x20
//! +4..C-1  body
//! +C       0x00
//! ```
//!
//! A candidate with a non-zero count that lands on a terminator and whose
//! fourth byte is a space is taken as a real line. A count below 4 gives a
//! line with an empty body that still takes part in the numbering checks. The body is then decoded unit by unit,
//! each unit consuming one byte (literal), two (keyword) or three (line
//! number reference). A terminator found between lines marks the end of a
//! program.
//!
//! Decoding is a chain of pure steps: `decode_unit` looks at the image
//! through a `ScanContext` and returns what it consumed and emitted; the
//! scanner alone owns the recovery state and the observer.

use crate::charset::render_byte;
use crate::diagnostics::{DecodeEvent, DecodeObserver};
use crate::image::ByteImage;
use crate::listing::Line;
use crate::opcode_tables::{
    lookup, unknown_pair_text, OpcodeGroup, Revision, CLAUSE_MARKER, ELSE_COMMAND, LINE_END,
    LINE_REFERENCE, SPACE, STATEMENT_SEPARATOR,
};
use crate::recovery::{RecoveryManager, ScanResult};
use crate::spacing::{space_after, space_before};

/// Bytes before the body: count, two line number bytes, space.
pub const LINE_HEADER_SIZE: usize = 4;

/// Verdict of the line-start test at one offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// The header or the terminator would lie past the end of the image.
    OutOfBounds,
    Rejected,
    Line { count: usize, number: u16 },
}

/// Test whether a stored line starts at `pos`.
pub fn candidate_at(image: &ByteImage, pos: usize) -> Candidate {
    let count = match image.get(pos) {
        Some(c) => c as usize,
        None => return Candidate::OutOfBounds,
    };
    if pos + 3 >= image.len() || pos + count >= image.len() {
        return Candidate::OutOfBounds;
    }
    if image.get(pos + count) != Some(LINE_END)
        || image.get(pos + 3) != Some(SPACE)
        || count == 0
    {
        return Candidate::Rejected;
    }
    Candidate::Line {
        count,
        number: image.read_u16_reversed(pos + 1),
    }
}

/// Where decoding stands inside one line body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanContext {
    pub position: usize,
    /// First byte of the previously decoded unit; `LINE_END` at line start.
    pub previous: u8,
    pub line_number: u16,
    /// Body bytes still owed, terminator included.
    pub remaining: usize,
}

impl ScanContext {
    /// Context for the body of a line whose count byte is at `line_start`.
    pub fn for_line(line_start: usize, count: usize, line_number: u16) -> Self {
        ScanContext {
            position: line_start + LINE_HEADER_SIZE,
            previous: LINE_END,
            line_number,
            // counts below 4 put the terminator inside the header
            remaining: (count + 1).saturating_sub(LINE_HEADER_SIZE),
        }
    }

    /// Step past a unit that decoded normally.
    pub fn advance(self, image: &ByteImage, unit: &DecodedUnit) -> Self {
        ScanContext {
            position: self.position + unit.consumed,
            previous: image.byte_or_zero(self.position),
            line_number: self.line_number,
            remaining: self.remaining - unit.consumed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Continue,
    /// The terminator closing the line.
    EndOfLine,
    /// A terminator with body bytes still owed.
    InteriorTerminator,
    /// A multi-byte unit that would run into the terminator.
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUnit {
    pub consumed: usize,
    pub text: String,
    pub outcome: UnitOutcome,
    pub event: Option<DecodeEvent>,
}

impl DecodedUnit {
    fn literal(consumed: usize, text: impl Into<String>) -> Self {
        DecodedUnit {
            consumed,
            text: text.into(),
            outcome: UnitOutcome::Continue,
            event: None,
        }
    }

    fn stop(outcome: UnitOutcome, event: Option<DecodeEvent>) -> Self {
        DecodedUnit {
            consumed: 0,
            text: String::new(),
            outcome,
            event,
        }
    }

    fn with_event(mut self, event: DecodeEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// Decode the unit at `ctx.position`.
pub fn decode_unit(image: &ByteImage, ctx: &ScanContext, revision: Revision) -> DecodedUnit {
    let addr = ctx.position;
    let b1 = image.byte_or_zero(addr);

    if let Some(group) = OpcodeGroup::from_byte(b1) {
        return decode_keyword(image, ctx, group, revision);
    }

    match b1 {
        LINE_REFERENCE => {
            if 3 >= ctx.remaining {
                return truncated(ctx);
            }
            DecodedUnit::literal(3, image.read_u16_reversed(addr + 1).to_string())
        }
        LINE_END => {
            if ctx.remaining > 1 {
                DecodedUnit::stop(
                    UnitOutcome::InteriorTerminator,
                    Some(DecodeEvent::InteriorTerminator {
                        address: addr,
                        line_number: ctx.line_number,
                    }),
                )
            } else {
                DecodedUnit {
                    consumed: 1,
                    text: String::new(),
                    outcome: UnitOutcome::EndOfLine,
                    event: None,
                }
            }
        }
        SPACE => DecodedUnit::literal(1, " "),
        STATEMENT_SEPARATOR => {
            // The device's editor never shows the ':' in front of ELSE.
            if revision.hides_separator_before_else()
                && image.peek_pair_skipping(addr + 1, SPACE) == (CLAUSE_MARKER, ELSE_COMMAND)
            {
                DecodedUnit::literal(1, "").with_event(DecodeEvent::SeparatorBeforeElse {
                    address: addr,
                    line_number: ctx.line_number,
                })
            } else {
                DecodedUnit::literal(1, ":")
            }
        }
        _ => {
            let rendered = render_byte(b1, revision);
            let unit = DecodedUnit::literal(1, rendered.as_str());
            if rendered.is_unknown() {
                unit.with_event(DecodeEvent::UnknownCharacter {
                    address: addr,
                    line_number: ctx.line_number,
                    byte: b1,
                })
            } else {
                unit
            }
        }
    }
}

fn decode_keyword(
    image: &ByteImage,
    ctx: &ScanContext,
    group: OpcodeGroup,
    revision: Revision,
) -> DecodedUnit {
    let addr = ctx.position;
    let width = group.width();
    if width >= ctx.remaining {
        return truncated(ctx);
    }

    let marker = group.marker();
    let command = image.byte_or_zero(addr + 1);
    let spacing = revision.normalizes_spacing();

    let mut text = String::new();
    if spacing && space_before(ctx.previous, marker) {
        text.push(' ');
    }

    let mut event = None;
    match lookup(marker, command, revision) {
        Some(keyword) => text.push_str(keyword.text),
        None => {
            text.push_str(&unknown_pair_text(marker, command));
            event = Some(DecodeEvent::UnknownOpcode {
                address: addr,
                line_number: ctx.line_number,
                group: marker,
                command,
            });
        }
    }

    if spacing && group.spaced_after() && space_after(ctx.previous, image.byte_or_zero(addr + width))
    {
        text.push(' ');
    }

    DecodedUnit {
        consumed: width,
        text,
        outcome: UnitOutcome::Continue,
        event,
    }
}

fn truncated(ctx: &ScanContext) -> DecodedUnit {
    DecodedUnit::stop(
        UnitOutcome::Truncated,
        Some(DecodeEvent::TruncatedToken {
            address: ctx.position,
            line_number: ctx.line_number,
        }),
    )
}

/// Result of decoding one accepted line body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDecode {
    /// Complete line; scanning resumes at `next`.
    Complete { line: Line, next: usize },
    /// Structurally broken line; scanning resumes at `next`, the offending
    /// byte.
    Broken { partial: Line, next: usize },
}

/// Decode the body of the line at `line_start`, reporting every event.
pub fn decode_line(
    image: &ByteImage,
    line_start: usize,
    count: usize,
    number: u16,
    revision: Revision,
    observer: &mut dyn DecodeObserver,
) -> LineDecode {
    let mut ctx = ScanContext::for_line(line_start, count, number);
    let mut text = String::new();

    while ctx.remaining > 0 {
        let unit = decode_unit(image, &ctx, revision);
        if let Some(event) = &unit.event {
            observer.on_event(event);
        }
        match unit.outcome {
            UnitOutcome::Continue => {
                text.push_str(&unit.text);
                ctx = ctx.advance(image, &unit);
            }
            UnitOutcome::EndOfLine => break,
            UnitOutcome::InteriorTerminator | UnitOutcome::Truncated => {
                return LineDecode::Broken {
                    partial: Line::new(number, line_start, text),
                    next: ctx.position,
                };
            }
        }
    }

    LineDecode::Complete {
        line: Line::new(number, line_start, text),
        next: (line_start + count + 1).max(line_start + LINE_HEADER_SIZE),
    }
}

/// Walks an address range and sorts what it finds into programs and
/// fragments.
pub struct LineScanner<'a> {
    image: &'a ByteImage,
    revision: Revision,
    observer: &'a mut dyn DecodeObserver,
    recovery: RecoveryManager,
}

impl<'a> LineScanner<'a> {
    pub fn new(
        image: &'a ByteImage,
        revision: Revision,
        observer: &'a mut dyn DecodeObserver,
    ) -> Self {
        LineScanner {
            image,
            revision,
            observer,
            recovery: RecoveryManager::new(),
        }
    }

    /// Scan `start..=end`. Lookahead may read beyond `end`, but never past
    /// the image.
    pub fn scan(mut self, start: usize, end: usize) -> ScanResult {
        let len = self.image.len();
        if len == 0 {
            return self.recovery.finish();
        }
        let end = end.min(len - 1);
        let mut pos = start;

        while pos <= end {
            match candidate_at(self.image, pos) {
                Candidate::OutOfBounds => pos += 1,
                Candidate::Rejected => {
                    if self.image.get(pos) == Some(LINE_END) {
                        self.complete_program();
                    }
                    pos += 1;
                }
                Candidate::Line { count, number } => {
                    if !self.recovery.admits(number) {
                        self.observer.on_event(&DecodeEvent::InvalidLineNumber {
                            address: pos,
                            line_number: number,
                            previous: self.recovery.last_line_number(),
                        });
                        self.discard_buffer();
                        pos += 1;
                        continue;
                    }
                    let decoded = decode_line(
                        self.image,
                        pos,
                        count,
                        number,
                        self.revision,
                        &mut *self.observer,
                    );
                    pos = match decoded {
                        LineDecode::Complete { line, next } => {
                            self.recovery.accept_line(line);
                            next
                        }
                        LineDecode::Broken { partial, next } => {
                            let address = self.recovery.buffer_address().unwrap_or(partial.address);
                            let lines = self.recovery.abandon_line(partial);
                            self.observer
                                .on_event(&DecodeEvent::FragmentDiscarded { address, lines });
                            next
                        }
                    };
                }
            }
        }

        self.discard_buffer();
        self.recovery.finish()
    }

    fn complete_program(&mut self) {
        let address = self.recovery.buffer_address();
        if let (Some(address), Some(lines)) = (address, self.recovery.complete_program()) {
            self.observer
                .on_event(&DecodeEvent::ProgramCompleted { address, lines });
        }
    }

    fn discard_buffer(&mut self) {
        let address = self.recovery.buffer_address();
        if let (Some(address), Some(lines)) = (address, self.recovery.discard_buffer()) {
            self.observer
                .on_event(&DecodeEvent::FragmentDiscarded { address, lines });
        }
    }
}

/// Scan one range with fresh state.
pub fn scan_range(
    image: &ByteImage,
    start: usize,
    end: usize,
    revision: Revision,
    observer: &mut dyn DecodeObserver,
) -> ScanResult {
    LineScanner::new(image, revision, observer).scan(start, end)
}
