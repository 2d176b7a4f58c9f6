//! Writing decoded listings to disk
//!
//! With a program area directory the output path is a pattern:
//! `listing.bas` becomes `listing0.bas` .. `listing9.bas`, one per area
//! that produced any text. Fragments and the unknown-opcode summary go
//! next to it as `listing.discarded.bas` and `listing.unknown.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::detokenizer::Decoding;
use crate::diagnostics::UnknownOpcodeReport;
use crate::error::DetokError;
use crate::listing::LineEnding;

/// Output path split into directory, stem and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPattern {
    dir: PathBuf,
    stem: String,
    ext: String,
}

impl OutputPattern {
    pub fn new(path: &Path) -> OutputPattern {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        OutputPattern { dir, stem, ext }
    }

    fn with_suffix(&self, suffix: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", self.stem, suffix, ext))
    }

    pub fn slot_path(&self, slot: u8) -> PathBuf {
        self.with_suffix(&slot.to_string(), &self.ext)
    }

    pub fn fragments_path(&self) -> PathBuf {
        self.with_suffix(".discarded", &self.ext)
    }

    pub fn report_path(&self) -> PathBuf {
        self.with_suffix(".unknown", ".txt")
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), DetokError> {
    fs::write(path, text).map_err(|e| DetokError::io(path, e))?;
    info!("Wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}

/// Write the recovered programs: one file per program area, or everything
/// to `output` when the image had no directory. Returns the files written.
pub fn write_sources(
    decoding: &Decoding,
    output: &Path,
    per_slot: bool,
    line_ending: LineEnding,
) -> Result<Vec<PathBuf>, DetokError> {
    let mut written = Vec::new();
    if per_slot {
        let pattern = OutputPattern::new(output);
        for block in &decoding.blocks {
            let Some(slot) = block.slot else { continue };
            if block.is_empty() {
                continue;
            }
            let path = pattern.slot_path(slot);
            write_file(&path, &block.text(line_ending))?;
            written.push(path);
        }
    } else {
        write_file(output, &decoding.all_sources(line_ending))?;
        written.push(output.to_path_buf());
    }
    Ok(written)
}

/// Dump every discarded fragment, each headed by its address.
pub fn write_fragments(
    decoding: &Decoding,
    output: &Path,
    line_ending: LineEnding,
) -> Result<PathBuf, DetokError> {
    let eol = line_ending.as_str();
    let mut text = String::new();
    for fragment in decoding.fragments().filter(|f| !f.is_empty()) {
        if let Some(address) = fragment.address() {
            text.push_str(&format!("' {:04X}{}", address, eol));
        }
        text.push_str(&fragment.render(line_ending));
        text.push_str(eol);
    }
    let path = OutputPattern::new(output).fragments_path();
    write_file(&path, &text)?;
    Ok(path)
}

pub fn write_report(report: &UnknownOpcodeReport, output: &Path) -> Result<PathBuf, DetokError> {
    let path = OutputPattern::new(output).report_path();
    write_file(&path, &report.to_string())?;
    Ok(path)
}
