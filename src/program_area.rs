//! Program area directory
//!
//! A full 64KB image ends with ten 15-byte records, one per program area
//! P0..P9:
//!
//! ```text
//! +0  start address (2 bytes, low byte first)
//! +2  0x00
//! +3  end address (2 bytes, low byte first)
//! +5  0x00
//! +6  0x80
//! +7  'P'
//! +8  ASCII digit of the area
//! +9  six spaces
//! ```
//!
//! Only the marker and digit are checked; the other bytes vary between
//! firmware states and are ignored.

use std::fmt;

use crate::image::ByteImage;

pub const RECORD_SIZE: usize = 15;
pub const SLOT_COUNT: usize = 10;

const OFFSET_START_ADDRESS: usize = 0;
const OFFSET_END_ADDRESS: usize = 3;
const OFFSET_MARKER: usize = 7;
const OFFSET_DIGIT: usize = 8;

const MARKER: u8 = b'P';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAreaSlot {
    pub number: u8,
    pub start: u16,
    pub end: u16,
    /// Where the directory record itself sits in the image.
    pub record_offset: usize,
}

impl ProgramAreaSlot {
    /// Parse the record at `offset`, if it carries the `P<digit>` marker.
    pub fn parse(image: &ByteImage, offset: usize) -> Option<ProgramAreaSlot> {
        let marker = image.get(offset + OFFSET_MARKER)?;
        let digit = image.get(offset + OFFSET_DIGIT)?;
        if marker != MARKER || !digit.is_ascii_digit() {
            return None;
        }
        Some(ProgramAreaSlot {
            number: digit - b'0',
            start: image.read_u16_reversed(offset + OFFSET_START_ADDRESS),
            end: image.read_u16_reversed(offset + OFFSET_END_ADDRESS),
            record_offset: offset,
        })
    }

    pub fn size(&self) -> i32 {
        self.end as i32 - self.start as i32
    }

    pub fn is_unused(&self) -> bool {
        self.size() <= 0
    }
}

impl fmt::Display for ProgramAreaSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_unused() {
            write!(f, "P{}: (Unused)", self.number)
        } else {
            write!(
                f,
                "P{}: {} bytes from {:X} to {:X}",
                self.number,
                self.size(),
                self.start,
                self.end
            )
        }
    }
}

/// Walk the last `SLOT_COUNT` records of the image and return every one
/// that parses. Images too small to hold a directory have none.
pub fn locate(image: &ByteImage) -> Vec<ProgramAreaSlot> {
    let table_size = RECORD_SIZE * SLOT_COUNT;
    if image.len() < table_size {
        return Vec::new();
    }
    let first = image.len() - table_size;
    (0..SLOT_COUNT)
        .filter_map(|i| ProgramAreaSlot::parse(image, first + i * RECORD_SIZE))
        .collect()
}

/// True only for a directory with every one of its ten records intact.
pub fn is_complete_directory(slots: &[ProgramAreaSlot]) -> bool {
    slots.len() == SLOT_COUNT
}
