//! Keyword tables for tokenized BASIC lines
//!
//! A keyword is stored as a group marker byte followed by a command byte.
//! The group numbering is arbitrary; it was worked out by comparing memory
//! dumps against program listings, so every mapping here is a best guess.
//! A handful of command codes never appear in the manual and are flagged as
//! speculative.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// End of a stored line; a second one right after a line ends the program.
pub const LINE_END: u8 = 0x00;
/// Shown as `:` on the device.
pub const STATEMENT_SEPARATOR: u8 = 0x01;
/// Followed by a two byte line number (low byte first).
pub const LINE_REFERENCE: u8 = 0x03;
pub const SPACE: u8 = 0x20;
pub const PAREN_OPEN: u8 = 0x28;
pub const SEMICOLON: u8 = 0x3B;
pub const EQUALS: u8 = 0x3D;

pub const REMARK_MARKER: u8 = 0x02;
pub const STATEMENT_MARKER: u8 = 0x04;
pub const FUNCTION_MARKER: u8 = 0x05;
pub const STRING_MARKER: u8 = 0x06;
pub const CLAUSE_MARKER: u8 = 0x07;

/// Command byte of `ELSE` in the clause group.
pub const ELSE_COMMAND: u8 = 0x48;

/// Command byte of the apostrophe remark. The marker alone is the token;
/// this byte is read for the lookup but decoded again as text.
pub const REMARK_COMMAND: u8 = 0x45;

/// Which decoder generation to emulate.
///
/// `Early` knows a reduced keyword set and none of the formatting rules;
/// `Full` is the complete table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Revision {
    Early,
    #[default]
    Full,
}

impl Revision {
    /// Insert spaces around keywords.
    pub fn normalizes_spacing(self) -> bool {
        self == Revision::Full
    }

    /// Drop the statement separator that precedes `ELSE`.
    pub fn hides_separator_before_else(self) -> bool {
        self == Revision::Full
    }
}

impl FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "early" => Ok(Revision::Early),
            "full" => Ok(Revision::Full),
            other => Err(format!("unknown revision '{}'", other)),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Revision::Early => write!(f, "early"),
            Revision::Full => write!(f, "full"),
        }
    }
}

/// Opcode group named by its marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeGroup {
    /// 0x02: the apostrophe remark. One byte wide, but the byte after it
    /// still selects the keyword.
    Remark,
    /// 0x04: statements and commands.
    Statement,
    /// 0x05: numeric functions.
    Function,
    /// 0x06: string functions.
    StringFunction,
    /// 0x07: secondary keywords and operators.
    Clause,
}

impl OpcodeGroup {
    pub fn from_byte(byte: u8) -> Option<OpcodeGroup> {
        match byte {
            REMARK_MARKER => Some(OpcodeGroup::Remark),
            STATEMENT_MARKER => Some(OpcodeGroup::Statement),
            FUNCTION_MARKER => Some(OpcodeGroup::Function),
            STRING_MARKER => Some(OpcodeGroup::StringFunction),
            CLAUSE_MARKER => Some(OpcodeGroup::Clause),
            _ => None,
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            OpcodeGroup::Remark => REMARK_MARKER,
            OpcodeGroup::Statement => STATEMENT_MARKER,
            OpcodeGroup::Function => FUNCTION_MARKER,
            OpcodeGroup::StringFunction => STRING_MARKER,
            OpcodeGroup::Clause => CLAUSE_MARKER,
        }
    }

    /// Bytes consumed by one token of this group.
    pub fn width(self) -> usize {
        match self {
            OpcodeGroup::Remark => 1,
            _ => 2,
        }
    }

    /// Whether a space may follow the keyword. The remark marker runs
    /// straight into its comment text.
    pub fn spaced_after(self) -> bool {
        self != OpcodeGroup::Remark
    }
}

/// Is `byte` one of the five group markers?
pub fn is_group_marker(byte: u8) -> bool {
    OpcodeGroup::from_byte(byte).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub group: OpcodeGroup,
    pub command: u8,
    pub text: &'static str,
    /// First decoder revision that recognised this keyword.
    pub since: Revision,
    /// Not in any documentation; inferred from dumps only.
    pub speculative: bool,
}

const fn kw(group: OpcodeGroup, command: u8, text: &'static str, since: Revision) -> Keyword {
    Keyword {
        group,
        command,
        text,
        since,
        speculative: false,
    }
}

const fn guess(group: OpcodeGroup, command: u8, text: &'static str) -> Keyword {
    Keyword {
        group,
        command,
        text,
        since: Revision::Full,
        speculative: true,
    }
}

use OpcodeGroup::{Clause, Function, Remark, Statement, StringFunction};
use Revision::{Early, Full};

#[rustfmt::skip]
pub const KEYWORDS: &[Keyword] = &[
    // 0x02 remark
    kw(Remark, REMARK_COMMAND, "'", Early),

    // 0x04 statements
    kw(Statement, 0x4A, "GOSUB", Early),
    kw(Statement, 0x4B, "RETURN", Early),
    kw(Statement, 0x4C, "RESUME", Early),
    kw(Statement, 0x4D, "RESTORE", Early),
    kw(Statement, 0x4E, "WRITE#", Full),
    kw(Statement, 0x53, "PASS", Early),
    kw(Statement, 0x57, "EDIT", Early),
    kw(Statement, 0x58, "LLIST", Full),
    kw(Statement, 0x59, "LOAD", Full),
    kw(Statement, 0x5D, "TRON", Early),
    kw(Statement, 0x5F, "TROFF", Early),
    kw(Statement, 0x60, "VERIFY", Full),
    kw(Statement, 0x63, "POKE", Early),
    kw(Statement, 0x6A, "CLEAR", Early),
    kw(Statement, 0x6B, "NEW", Full),
    kw(Statement, 0x6C, "SAVE", Full),
    kw(Statement, 0x6E, "ANGLE", Full),
    kw(Statement, 0x70, "BEEP", Early),
    kw(Statement, 0x71, "CLS", Early),
    kw(Statement, 0x72, "CLOSE", Early),
    guess(Statement, 0x76, "DEF"),
    kw(Statement, 0x78, "DEFSEG", Early),
    kw(Statement, 0x7C, "DIM", Early),
    kw(Statement, 0x80, "DATA", Early),
    kw(Statement, 0x81, "FOR", Early),
    kw(Statement, 0x82, "NEXT", Early),
    kw(Statement, 0x85, "ERASE", Early),
    kw(Statement, 0x86, "ERROR", Early),
    kw(Statement, 0x87, "END", Early),
    kw(Statement, 0x8D, "IF", Early),
    kw(Statement, 0x8F, "LET", Early),
    kw(Statement, 0x91, "LOCATE", Early),
    kw(Statement, 0x97, "OPEN", Early),
    kw(Statement, 0x99, "OUT", Full),
    kw(Statement, 0x9A, "ON", Early),
    guess(Statement, 0x9F, "CALCJMP"),
    kw(Statement, 0xA3, "PRINT", Early),
    kw(Statement, 0xA4, "LPRINT", Full),
    guess(Statement, 0xA5, "PUT"),
    kw(Statement, 0xA8, "READ", Early),
    kw(Statement, 0xA9, "REM", Early),
    kw(Statement, 0xAC, "SET", Early),
    kw(Statement, 0xAE, "STOP", Early),
    guess(Statement, 0xB0, "MODE"),
    // the statement group reuses the clause codes for these two
    kw(Statement, 0x47, "THEN", Early),
    kw(Statement, 0x49, "GOTO", Early),

    // 0x05 numeric functions
    kw(Function, 0x4F, "ERL", Early),
    kw(Function, 0x50, "ERR", Full),
    kw(Function, 0x60, "PI", Full),
    kw(Function, 0x63, "CUR", Full),
    kw(Function, 0x67, "FACT", Full),
    kw(Function, 0x6B, "SIN", Full),
    kw(Function, 0x6C, "COS", Full),
    kw(Function, 0x6D, "TAN", Full),
    kw(Function, 0x6E, "ASN", Full),
    kw(Function, 0x6F, "ACS", Full),
    kw(Function, 0x70, "ATN", Full),
    kw(Function, 0x71, "HYPSIN", Full),
    kw(Function, 0x72, "HYPCOS", Full),
    kw(Function, 0x73, "HYPTAN", Full),
    kw(Function, 0x74, "HYPASN", Full),
    kw(Function, 0x75, "HYPACS", Full),
    kw(Function, 0x76, "HYPATN", Full),
    kw(Function, 0x77, "LN", Full),
    kw(Function, 0x78, "LOG", Full),
    kw(Function, 0x79, "EXP", Full),
    kw(Function, 0x7A, "SQR", Full),
    kw(Function, 0x7B, "ABS", Full),
    kw(Function, 0x7C, "SGN", Full),
    kw(Function, 0x7D, "INT", Full),
    kw(Function, 0x7E, "FIX", Full),
    kw(Function, 0x7F, "FRAC", Full),
    kw(Function, 0x86, "PEEK", Early),
    kw(Function, 0x8A, "EOF", Full),
    kw(Function, 0x8D, "FRE", Early),
    kw(Function, 0x90, "ROUND", Full),
    kw(Function, 0x92, "VALF", Full),
    kw(Function, 0x93, "RAN#", Full),
    kw(Function, 0x94, "ASC", Full),
    kw(Function, 0x95, "LEN", Full),
    kw(Function, 0x96, "VAL", Full),
    kw(Function, 0x9C, "DEG", Full),
    kw(Function, 0xA7, "REC", Full),
    kw(Function, 0xA8, "POL", Full),
    kw(Function, 0xAA, "NPR", Full),
    kw(Function, 0xAB, "NCR", Full),

    // 0x06 string functions
    kw(StringFunction, 0x97, "DMS$", Full),
    kw(StringFunction, 0x9B, "INPUT", Early),
    kw(StringFunction, 0x9C, "MID$", Full),
    kw(StringFunction, 0x9D, "RIGHT$", Full),
    kw(StringFunction, 0x9E, "LEFT$", Full),
    kw(StringFunction, 0xA0, "CHR$", Early),
    kw(StringFunction, 0xA1, "STR$", Full),
    kw(StringFunction, 0xA3, "HEX$", Full),
    kw(StringFunction, 0xA8, "INKEY$", Full),
    kw(StringFunction, 0xAD, "CALC$", Full),

    // 0x07 clauses and operators
    kw(Clause, 0x47, "THEN", Early),
    kw(Clause, ELSE_COMMAND, "ELSE", Early),
    kw(Clause, 0x49, "GOTO", Early),
    kw(Clause, 0xB6, "TAB", Early),
    kw(Clause, 0xBB, "ALL", Full),
    kw(Clause, 0xBC, "AS", Early),
    kw(Clause, 0xC0, "STEP", Early),
    kw(Clause, 0xC1, "TO", Early),
    kw(Clause, 0xC3, "NOT", Full),
    kw(Clause, 0xC4, "AND", Full),
    kw(Clause, 0xC5, "OR", Full),
    kw(Clause, 0xC6, "XOR", Full),
    kw(Clause, 0xC7, "MOD", Full),
];

/// The early decoder printed INKEY without its dollar sign.
static EARLY_INKEY: Keyword = kw(StringFunction, 0xA8, "INKEY", Early);

lazy_static! {
    static ref KEYWORD_INDEX: HashMap<(u8, u8), &'static Keyword> = {
        let mut m = HashMap::with_capacity(KEYWORDS.len());
        for k in KEYWORDS {
            m.insert((k.group.marker(), k.command), k);
        }
        m
    };
}

/// Find the keyword for a `(group, command)` pair as known to `revision`.
pub fn lookup(group: u8, command: u8, revision: Revision) -> Option<&'static Keyword> {
    if revision == Revision::Early && group == STRING_MARKER && command == EARLY_INKEY.command {
        return Some(&EARLY_INKEY);
    }
    KEYWORD_INDEX
        .get(&(group, command))
        .copied()
        .filter(|k| k.since <= revision)
}

/// Placeholder emitted for a pair with no keyword: command first, then
/// group, both in bare upper-case hex.
pub fn unknown_pair_text(group: u8, command: u8) -> String {
    format!("{{{:X} {:X}}}", command, group)
}
