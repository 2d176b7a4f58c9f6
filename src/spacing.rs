//! Spacing around decoded keywords
//!
//! Stored lines only keep the spaces the user typed, and most users typed
//! none, so a literal rendering fuses keywords with their neighbours
//! (`IFA=1THENPRINT`). These rules put single spaces back in the places the
//! device's own listing shows them. They are heuristics inferred from
//! listings and are reproduced as observed, including the asymmetry around
//! `=`, `:` and end of line.

use crate::charset::is_alphanumeric;
use crate::opcode_tables::{
    is_group_marker, EQUALS, LINE_END, PAREN_OPEN, SEMICOLON, SPACE, STATEMENT_SEPARATOR,
};

/// Space to insert before a keyword starting with `current`, given the
/// first byte of the previous decoded unit.
pub fn space_before(previous: u8, current: u8) -> bool {
    match previous {
        LINE_END | SPACE | SEMICOLON => false,
        _ => !is_group_marker(previous) && is_alphanumeric(previous) && is_group_marker(current),
    }
}

/// Space to insert after a keyword, given the first byte of the unit
/// before the keyword and the byte that follows it.
pub fn space_after(previous: u8, following: u8) -> bool {
    match following {
        SPACE | PAREN_OPEN => false,
        EQUALS | STATEMENT_SEPARATOR | LINE_END => is_group_marker(previous),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_before_keyword_after_identifier() {
        // A followed by THEN
        assert!(space_before(b'A', 0x07));
        assert!(space_before(b'9', 0x04));
        assert!(space_before(b'z', 0x05));
    }

    #[test]
    fn test_no_space_before_after_separators() {
        assert!(!space_before(LINE_END, 0x04));
        assert!(!space_before(SPACE, 0x04));
        assert!(!space_before(SEMICOLON, 0x04));
        assert!(!space_before(b'"', 0x04));
        assert!(!space_before(b')', 0x05));
        // keyword after keyword gets its space from space_after
        assert!(!space_before(0x04, 0x07));
    }

    #[test]
    fn test_space_after_keyword() {
        assert!(space_after(LINE_END, b'A'));
        assert!(space_after(b'A', b'"'));
        assert!(!space_after(b'A', SPACE));
        assert!(!space_after(b'A', PAREN_OPEN));
    }

    #[test]
    fn test_space_after_depends_on_previous_unit() {
        // X=PI=... style: literal before the keyword, no space before '='
        assert!(!space_after(b'X', EQUALS));
        assert!(!space_after(b'X', STATEMENT_SEPARATOR));
        assert!(!space_after(b'X', LINE_END));
        // keyword before the keyword: keep the space
        assert!(space_after(0x04, EQUALS));
        assert!(space_after(0x07, STATEMENT_SEPARATOR));
        assert!(space_after(0x05, LINE_END));
    }
}
