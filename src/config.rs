//! Settings file for the `detok` binary
//!
//! ```toml
//! address = "0x2000"
//! revision = "full"
//! line_ending = "crlf"
//! write_fragments = true
//! write_unknown_report = false
//! ```
//!
//! Every key is optional. Command line flags win over the file.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::detokenizer::DecoderOptions;
use crate::error::DetokError;
use crate::listing::LineEnding;
use crate::opcode_tables::Revision;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetokConfig {
    pub address: Option<String>,
    pub revision: Option<String>,
    pub line_ending: Option<String>,
    pub write_fragments: bool,
    pub write_unknown_report: bool,
}

impl DetokConfig {
    pub fn load(path: &Path) -> Result<DetokConfig, DetokError> {
        let content = fs::read_to_string(path).map_err(|e| DetokError::io(path, e))?;
        let config = Self::parse(&content)
            .map_err(|e| DetokError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<DetokConfig, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the textual settings into decoder options.
    pub fn decoder_options(&self) -> Result<DecoderOptions, DetokError> {
        let start = match &self.address {
            Some(addr) => parse_address(addr)?,
            None => 0,
        };
        let revision = match &self.revision {
            Some(r) => r.parse::<Revision>().map_err(DetokError::Config)?,
            None => Revision::default(),
        };
        let line_ending = match &self.line_ending {
            Some(l) => l.parse::<LineEnding>().map_err(DetokError::Config)?,
            None => LineEnding::default(),
        };
        Ok(DecoderOptions {
            start,
            revision,
            line_ending,
        })
    }
}

/// Parse a start address. Plain digits and `0x` prefixes are hexadecimal,
/// as the device prints addresses; a `0d` prefix selects decimal.
pub fn parse_address(text: &str) -> Result<usize, DetokError> {
    let trimmed = text.trim();
    let invalid = || DetokError::InvalidAddress(text.to_string());

    let (digits, radix) = if let Some(rest) = trimmed
        .strip_prefix("0d")
        .or_else(|| trimmed.strip_prefix("0D"))
    {
        (rest, 10)
    } else if let Some(rest) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        (rest, 16)
    } else {
        (trimmed, 16)
    };

    if digits.is_empty() {
        return Err(invalid());
    }
    usize::from_str_radix(digits, radix).map_err(|_| invalid())
}
