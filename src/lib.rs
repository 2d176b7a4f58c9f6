#![crate_name = "detok"]

#[macro_use]
extern crate lazy_static;

pub mod charset;
pub mod config;
pub mod detokenizer;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod listing;
pub mod opcode_tables;
pub mod output;
pub mod program_area;
pub mod recovery;
pub mod scanner;
pub mod spacing;

#[cfg(test)]
mod scanner_tests;

pub use detokenizer::{DecoderOptions, Decoding, Detokenizer, TextBlock};
pub use error::DetokError;
pub use image::ByteImage;
pub use listing::LineEnding;
pub use opcode_tables::Revision;

/*
Stored line layout, FX-880P family

        +0      count: offset of the terminator from this byte
        +1 +2   line number, low byte first
        +3      0x20
        +4      body: literal characters, 0x01 statement separator,
                0x02 remark (0x45 after it selects the apostrophe),
                0x03 lo hi line reference,
                0x04..0x07 cmd keyword from one of four tables
        +count  0x00

A program is a run of lines with rising numbers followed by one more 0x00.
Full 64KB dumps end with the P0..P9 program area directory, 15 bytes per
area.
*/
