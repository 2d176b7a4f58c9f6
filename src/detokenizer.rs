//! Whole-image decoding
//!
//! A dump taken from address 0 of a full memory image carries the program
//! area directory, and each used area is decoded on its own. Any other dump
//! (a partial image, or decoding from a later offset) is scanned as one
//! range up to the end of the image.

use log::debug;

use crate::diagnostics::{DecodeEvent, DecodeObserver};
use crate::image::ByteImage;
use crate::listing::{join_programs, DiscardedFragment, LineEnding};
use crate::opcode_tables::Revision;
use crate::program_area::{self, ProgramAreaSlot};
use crate::recovery::ScanResult;
use crate::scanner::scan_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderOptions {
    /// Offset to start scanning from. The directory is only consulted
    /// when this is 0; an offset past the end of the image counts as 0.
    pub start: usize,
    pub revision: Revision,
    pub line_ending: LineEnding,
}

/// Output of one scanned range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Program area number, or `None` for a whole-image scan.
    pub slot: Option<u8>,
    pub result: ScanResult,
}

impl TextBlock {
    pub fn text(&self, line_ending: LineEnding) -> String {
        join_programs(&self.result.programs, line_ending)
    }

    pub fn is_empty(&self) -> bool {
        self.result.programs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoding {
    pub blocks: Vec<TextBlock>,
}

impl Decoding {
    /// Every recovered program across all blocks, in block order.
    pub fn all_sources(&self, line_ending: LineEnding) -> String {
        let programs: Vec<_> = self
            .blocks
            .iter()
            .flat_map(|b| b.result.programs.iter().cloned())
            .collect();
        join_programs(&programs, line_ending)
    }

    pub fn fragments(&self) -> impl Iterator<Item = &DiscardedFragment> {
        self.blocks.iter().flat_map(|b| b.result.fragments.iter())
    }

    pub fn program_count(&self) -> usize {
        self.blocks.iter().map(|b| b.result.programs.len()).sum()
    }
}

pub struct Detokenizer<'a> {
    image: &'a ByteImage,
    options: DecoderOptions,
    slots: Vec<ProgramAreaSlot>,
}

impl<'a> Detokenizer<'a> {
    pub fn new(image: &'a ByteImage, mut options: DecoderOptions) -> Detokenizer<'a> {
        if options.start >= image.len() && options.start != 0 {
            debug!(
                "start {:X} is past the end of the image, decoding from 0",
                options.start
            );
            options.start = 0;
        }
        let slots = if options.start == 0 {
            program_area::locate(image)
        } else {
            Vec::new()
        };
        debug!(
            "{} bytes, start {:X}, {} directory record(s)",
            image.len(),
            options.start,
            slots.len()
        );
        Detokenizer {
            image,
            options,
            slots,
        }
    }

    pub fn has_program_areas(&self) -> bool {
        program_area::is_complete_directory(&self.slots)
    }

    pub fn slots(&self) -> &[ProgramAreaSlot] {
        &self.slots
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn decode(&self, observer: &mut dyn DecodeObserver) -> Decoding {
        if self.options.start == 0 {
            observer.on_event(&DecodeEvent::SlotsLocated {
                count: self.slots.len(),
            });
            for slot in &self.slots {
                observer.on_event(&DecodeEvent::SlotFound { slot: *slot });
            }
        }

        if !self.has_program_areas() {
            let end = self.image.len().saturating_sub(1);
            let result = scan_range(
                self.image,
                self.options.start,
                end,
                self.options.revision,
                observer,
            );
            return Decoding {
                blocks: vec![TextBlock { slot: None, result }],
            };
        }

        let mut blocks = Vec::new();
        for slot in self.slots.iter().filter(|s| !s.is_unused()) {
            observer.on_event(&DecodeEvent::SlotStarted {
                number: slot.number,
            });
            let result = scan_range(
                self.image,
                slot.start as usize,
                slot.end as usize,
                self.options.revision,
                observer,
            );
            observer.on_event(&DecodeEvent::SlotCompleted {
                number: slot.number,
                programs: result.programs.len(),
                fragments: result.fragments.len(),
            });
            blocks.push(TextBlock {
                slot: Some(slot.number),
                result,
            });
        }
        Decoding { blocks }
    }
}
