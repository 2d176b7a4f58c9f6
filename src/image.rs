//! Memory image access
//!
//! A dump is read once and never modified. Every multi-byte value the
//! device stores (line numbers, addresses in the program area directory) is
//! little-endian: low byte first, high byte second.

use crate::error::DetokError;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteImage {
    bytes: Vec<u8>,
}

impl ByteImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        ByteImage { bytes }
    }

    /// Load and concatenate one or more dump files, in the order given.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DetokError> {
        let mut bytes = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let mut file = File::open(path).map_err(|e| DetokError::io(path, e))?;
            let before = bytes.len();
            file.read_to_end(&mut bytes)
                .map_err(|e| DetokError::io(path, e))?;
            debug!(
                "Loaded {} bytes from {} at offset {:04X}",
                bytes.len() - before,
                path.display(),
                before
            );
        }
        Ok(ByteImage { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn get(&self, addr: usize) -> Option<u8> {
        self.bytes.get(addr).copied()
    }

    /// Byte at `addr`, or 0 past the end of the image.
    pub fn byte_or_zero(&self, addr: usize) -> u8 {
        self.get(addr).unwrap_or(0)
    }

    /// Two bytes at `addr`, low byte first. Reads past the end yield 0.
    pub fn read_u16_reversed(&self, addr: usize) -> u16 {
        match (self.get(addr), addr.checked_add(1).and_then(|a| self.get(a))) {
            (Some(lo), Some(hi)) => u16::from_le_bytes([lo, hi]),
            _ => 0,
        }
    }

    /// First byte at or after `addr` that is not `skip`, paired with the
    /// byte after it. Missing bytes read as 0.
    pub fn peek_pair_skipping(&self, addr: usize, skip: u8) -> (u8, u8) {
        let mut pos = addr;
        while self.get(pos) == Some(skip) {
            pos += 1;
        }
        (self.byte_or_zero(pos), self.byte_or_zero(pos + 1))
    }
}

impl From<Vec<u8>> for ByteImage {
    fn from(bytes: Vec<u8>) -> Self {
        ByteImage::new(bytes)
    }
}

impl From<&[u8]> for ByteImage {
    fn from(bytes: &[u8]) -> Self {
        ByteImage::new(bytes.to_vec())
    }
}
