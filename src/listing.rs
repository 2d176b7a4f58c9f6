//! Decoded lines and programs
//!
//! A `Line` keeps its number apart from its text so the recovery rules can
//! compare numbers without reparsing; the listing form `"<number> <text>"`
//! is only produced when rendering.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" | "unix" => Ok(LineEnding::Lf),
            "crlf" | "dos" | "windows" => Ok(LineEnding::CrLf),
            other => Err(format!("unknown line ending '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: u16,
    /// Offset of the line's count byte in the image.
    pub address: usize,
    /// Decoded body, without the line number.
    pub text: String,
}

impl Line {
    pub fn new(number: u16, address: usize, text: impl Into<String>) -> Self {
        Line {
            number,
            address,
            text: text.into(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.number, self.text)
    }
}

fn render_lines(lines: &[Line], ending: LineEnding) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push_str(ending.as_str());
    }
    out
}

/// A run of lines closed off by an end-of-program marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedProgram {
    pub lines: Vec<Line>,
}

impl DecodedProgram {
    pub fn address(&self) -> Option<usize> {
        self.lines.first().map(|l| l.address)
    }

    pub fn line_numbers(&self) -> Vec<u16> {
        self.lines.iter().map(|l| l.number).collect()
    }

    pub fn render(&self, ending: LineEnding) -> String {
        render_lines(&self.lines, ending)
    }
}

/// Text abandoned before an end-of-program marker was seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscardedFragment {
    pub lines: Vec<Line>,
    /// A line cut short by a structural error, if that is what ended the
    /// fragment.
    pub partial: Option<Line>,
}

impl DiscardedFragment {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.partial.is_none()
    }

    pub fn address(&self) -> Option<usize> {
        self.lines
            .first()
            .or(self.partial.as_ref())
            .map(|l| l.address)
    }

    pub fn render(&self, ending: LineEnding) -> String {
        let mut out = render_lines(&self.lines, ending);
        if let Some(partial) = &self.partial {
            out.push_str(&partial.to_string());
            out.push_str(ending.as_str());
        }
        out
    }
}

/// Programs as one text: each line ends with a line break and programs are
/// separated by a blank line.
pub fn join_programs(programs: &[DecodedProgram], ending: LineEnding) -> String {
    programs
        .iter()
        .map(|p| p.render(ending))
        .collect::<Vec<_>>()
        .join(ending.as_str())
}
