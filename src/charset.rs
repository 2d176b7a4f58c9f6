//! Device character set
//!
//! Maps a raw byte from a program line to the text the pocket computer would
//! show on its LCD. The upper half of the table follows the Casio calculator
//! character set: Greek letters, superscripts, half-width katakana, arrows,
//! comparison symbols and a handful of date/currency glyphs.

use crate::opcode_tables::Revision;

/// Result of mapping one literal byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Known(&'static str),
    /// No glyph for this byte; carries the `{XX}` placeholder.
    Unknown(String),
}

impl Rendered {
    pub fn as_str(&self) -> &str {
        match self {
            Rendered::Known(s) => s,
            Rendered::Unknown(s) => s,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Rendered::Unknown(_))
    }
}

/// Byte → glyph table for the full character set.
///
/// Entries are strings rather than `char` because 0x9E (superscript minus
/// one) needs two code points.
#[rustfmt::skip]
pub const DEVICE_CHARSET: [Option<&str>; 256] = [
    // 0x00-0x0F
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0x10-0x1F
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0x20-0x2F
    Some(" "), Some("!"), Some("\""), Some("#"), Some("$"), Some("%"), Some("&"), Some("'"),
    Some("("), Some(")"), Some("*"), Some("+"), Some(","), Some("-"), Some("."), Some("/"),
    // 0x30-0x3F
    Some("0"), Some("1"), Some("2"), Some("3"), Some("4"), Some("5"), Some("6"), Some("7"),
    Some("8"), Some("9"), Some(":"), Some(";"), Some("<"), Some("="), Some(">"), Some("?"),
    // 0x40-0x4F
    Some("@"), Some("A"), Some("B"), Some("C"), Some("D"), Some("E"), Some("F"), Some("G"),
    Some("H"), Some("I"), Some("J"), Some("K"), Some("L"), Some("M"), Some("N"), Some("O"),
    // 0x50-0x5F
    Some("P"), Some("Q"), Some("R"), Some("S"), Some("T"), Some("U"), Some("V"), Some("W"),
    Some("X"), Some("Y"), Some("Z"), Some("["), Some("\u{00A5}"), Some("]"), Some("^"), Some("_"),
    // 0x60-0x6F
    Some("`"), Some("a"), Some("b"), Some("c"), Some("d"), Some("e"), Some("f"), Some("g"),
    Some("h"), Some("i"), Some("j"), Some("k"), Some("l"), Some("m"), Some("n"), Some("o"),
    // 0x70-0x7F
    Some("p"), Some("q"), Some("r"), Some("s"), Some("t"), Some("u"), Some("v"), Some("w"),
    Some("x"), Some("y"), Some("z"), Some("{"), Some("|"), Some("}"), Some("~"), Some(" "),
    // 0x80-0x8F
    Some("\u{212B}"), Some("\u{222B}"), Some("\u{221A}"), Some("\u{00B4}"),
    Some("\u{03A3}"), Some("\u{03A9}"), Some("\u{2592}"), Some("\u{25AE}"),
    Some("\u{03B1}"), Some("\u{03B2}"), Some("\u{03B3}"), Some("\u{03B5}"),
    Some("\u{03B8}"), Some("\u{03BC}"), Some("\u{03C3}"), Some("\u{03A6}"),
    // 0x90-0x9F
    Some("\u{2070}"), Some("\u{00B9}"), Some("\u{00B2}"), Some("\u{00B3}"),
    Some("\u{2074}"), Some("\u{2075}"), Some("\u{2076}"), Some("\u{2077}"),
    Some("\u{2078}"), Some("\u{2079}"), Some("\u{207A}"), Some("\u{207B}"),
    Some("\u{207F}"), Some("\u{02E3}"), Some("\u{207B}\u{00B9}"), Some("\u{00F7}"),
    // 0xA0-0xAF
    Some("\u{00A0}"), Some("\u{FF61}"), Some("\u{FF62}"), Some("\u{FF63}"),
    Some("\u{FF64}"), Some("\u{FF65}"), Some("\u{FF66}"), Some("\u{FF67}"),
    Some("\u{FF68}"), Some("\u{FF69}"), Some("\u{FF6A}"), Some("\u{FF6B}"),
    Some("\u{FF6C}"), Some("\u{FF6D}"), Some("\u{FF6E}"), Some("\u{FF6F}"),
    // 0xB0-0xBF
    Some("\u{FF70}"), Some("\u{FF71}"), Some("\u{FF72}"), Some("\u{FF73}"),
    Some("\u{FF74}"), Some("\u{FF75}"), Some("\u{FF76}"), Some("\u{FF77}"),
    Some("\u{FF78}"), Some("\u{FF79}"), Some("\u{FF7A}"), Some("\u{FF7B}"),
    Some("\u{FF7C}"), Some("\u{FF7D}"), Some("\u{FF7E}"), Some("\u{FF7F}"),
    // 0xC0-0xCF
    Some("\u{FF80}"), Some("\u{FF81}"), Some("\u{FF82}"), Some("\u{FF83}"),
    Some("\u{FF84}"), Some("\u{FF85}"), Some("\u{FF86}"), Some("\u{FF87}"),
    Some("\u{FF88}"), Some("\u{FF89}"), Some("\u{FF8A}"), Some("\u{FF8B}"),
    Some("\u{FF8C}"), Some("\u{FF8D}"), Some("\u{FF8E}"), Some("\u{FF8F}"),
    // 0xD0-0xDF
    Some("\u{FF90}"), Some("\u{FF91}"), Some("\u{FF92}"), Some("\u{FF93}"),
    Some("\u{FF94}"), Some("\u{FF95}"), Some("\u{FF96}"), Some("\u{FF97}"),
    Some("\u{FF98}"), Some("\u{FF99}"), Some("\u{FF9A}"), Some("\u{FF9B}"),
    Some("\u{FF9C}"), Some("\u{FF9D}"), Some("\u{FF9E}"), Some("\u{FF9F}"),
    // 0xE0-0xEF
    Some("\u{2265}"), Some("\u{2264}"), Some("\u{2260}"), Some("\u{2191}"),
    Some("\u{2190}"), Some("\u{2193}"), Some("\u{2192}"), Some("\u{03C0}"),
    Some("\u{2260}"), Some("\u{2265}"), Some("\u{2666}"), Some("\u{2663}"),
    Some("\u{25A1}"), Some("\u{25CB}"), Some("\u{25B3}"), Some("\u{005C}"),
    // 0xF0-0xFF
    Some("\u{00D7}"), Some("\u{5186}"), Some("\u{5E74}"), Some("\u{6708}"),
    Some("\u{65E5}"), Some("\u{5343}"), Some("\u{4E07}"), Some("\u{00A3}"),
    Some("\u{00A2}"), Some("\u{00B1}"), Some("\u{2213}"), Some("\u{1D52}"),
    None, None, None, None,
];

/// Printable ASCII 0x21..=0x7D as single-character strings, indexed by
/// `byte - 0x21`. The early decoder knew nothing beyond this range.
const EARLY_CHARSET: &str =
    "!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}";

/// Look up the glyph for `byte`, if the given decoder revision has one.
pub fn map_byte(byte: u8, revision: Revision) -> Option<&'static str> {
    match revision {
        Revision::Full => DEVICE_CHARSET[byte as usize],
        Revision::Early => match byte {
            0x21..=0x7D => {
                let idx = (byte - 0x21) as usize;
                Some(&EARLY_CHARSET[idx..idx + 1])
            }
            _ => None,
        },
    }
}

/// Map `byte`, falling back to the `{XX}` placeholder for unmapped values.
pub fn render_byte(byte: u8, revision: Revision) -> Rendered {
    match map_byte(byte, revision) {
        Some(s) => Rendered::Known(s),
        None => Rendered::Unknown(format!("{{{:X}}}", byte)),
    }
}

/// Letters and digits in plain ASCII; used by the spacing rules.
pub fn is_alphanumeric(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}
