//! Region scanning for TwinCAT source XML.
//!
//! TwinCAT project files embed Structured Text in CDATA sections. The scanner
//! walks the file line by line and splits it into regions: the XML markup
//! itself and the declaration/implementation code blocks. It is not an XML
//! parser; it only recognizes the two CDATA delimiter pairs, tracked with a
//! small line/column state machine.
//!
//! Concatenating the lines of all regions in scan order reproduces the input
//! exactly, so everything outside the code blocks survives formatting
//! untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder name used before any `Name` attribute has been seen.
const UNKNOWN_NAME: &str = "<unknown>";

/// Matches the `Name` attribute of POU/property/method elements.
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r#"Name="(\w+)""#));

/// Build a regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this crate are compile-time constants that are verified by tests. The
/// panic occurs at first access of the `LazyLock` static.
pub(crate) fn build_re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

/// Classification of a scanned region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// XML markup, never handed to formatting rules.
    Xml,
    /// Variable declaration block of a POU, method or property.
    Declaration,
    /// Implementation (statement) block.
    Implementation,
}

impl Kind {
    /// Short tag used in correction reports.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Kind::Xml => "xml",
            Kind::Declaration => "declaration",
            Kind::Implementation => "implementation",
        }
    }
}

/// A contiguous slice of the source file.
///
/// The first and last line of a region can be partial when a delimiter sits
/// mid-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: Kind,
    /// Raw lines including their terminators.
    pub lines: Vec<String>,
    /// `Name` attribute of the nearest preceding named element, for
    /// diagnostics.
    pub name: String,
}

/// One legal state change of the delimiter machine.
struct Transition {
    from: Kind,
    token: &'static str,
    to: Kind,
    /// Closing delimiters belong to the region they enter; opening
    /// delimiters stay with the region before the switch.
    token_starts_region: bool,
}

const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Kind::Xml,
        token: "<Declaration><![CDATA[",
        to: Kind::Declaration,
        token_starts_region: false,
    },
    Transition {
        from: Kind::Xml,
        token: "<ST><![CDATA[",
        to: Kind::Implementation,
        token_starts_region: false,
    },
    Transition {
        from: Kind::Declaration,
        token: "]]></Declaration>",
        to: Kind::Xml,
        token_starts_region: true,
    },
    Transition {
        from: Kind::Implementation,
        token: "]]></ST>",
        to: Kind::Xml,
        token_starts_region: true,
    },
];

/// Point where a new region starts, in (row, column) coordinates.
#[derive(Debug)]
struct Boundary {
    row: usize,
    col: usize,
    kind: Kind,
    name: String,
}

/// Line/column state machine emitting region boundaries.
struct Machine {
    kind: Kind,
    name: String,
    boundaries: Vec<Boundary>,
}

impl Machine {
    fn new() -> Self {
        Self {
            kind: Kind::Xml,
            name: UNKNOWN_NAME.to_string(),
            boundaries: vec![Boundary {
                row: 0,
                col: 0,
                kind: Kind::Xml,
                name: UNKNOWN_NAME.to_string(),
            }],
        }
    }

    fn parse(&mut self, content: &[String]) {
        for (row, line) in content.iter().enumerate() {
            if let Some(caps) = NAME_RE.captures(line) {
                self.name = caps[1].to_string();
            }
            let mut col = 0;
            while let Some((pos, transition)) = self.next_transition(line, col) {
                self.kind = transition.to;
                let boundary_col = if transition.token_starts_region {
                    pos
                } else {
                    pos + transition.token.len()
                };
                self.boundaries.push(Boundary {
                    row,
                    col: boundary_col,
                    kind: transition.to,
                    name: self.name.clone(),
                });
                col = pos + transition.token.len();
            }
        }
    }

    /// Earliest delimiter match at or after `col` that is legal in the
    /// current state.
    fn next_transition(&self, line: &str, col: usize) -> Option<(usize, &'static Transition)> {
        TRANSITIONS
            .iter()
            .filter(|t| t.from == self.kind)
            .filter_map(|t| line[col..].find(t.token).map(|pos| (col + pos, t)))
            .min_by_key(|(pos, _)| *pos)
    }
}

/// Split file content into regions.
///
/// `content` holds the file's lines with their terminators kept (see
/// [`crate::process::split_lines`]). Empty input produces no regions.
#[must_use]
pub fn scan(content: &[String]) -> Vec<Region> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut machine = Machine::new();
    machine.parse(content);

    let last = content.len() - 1;
    machine.boundaries.push(Boundary {
        row: content.len(),
        col: content[last].len(),
        kind: Kind::Xml,
        name: UNKNOWN_NAME.to_string(),
    });

    let mut regions = Vec::with_capacity(machine.boundaries.len() - 1);
    for pair in machine.boundaries.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let last_row = end.row.min(last);
        let mut lines: Vec<String> = content[start.row..=last_row].to_vec();
        if start.row == end.row {
            lines[0] = lines[0][start.col..end.col].to_string();
        } else {
            if start.col > 0 {
                lines[0] = lines[0][start.col..].to_string();
            }
            if let Some(tail) = lines.last_mut() {
                if end.col < tail.len() {
                    *tail = tail[..end.col].to_string();
                }
            }
        }
        regions.push(Region {
            kind: start.kind,
            lines,
            name: start.name.clone(),
        });
    }
    regions
}
