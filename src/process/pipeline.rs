//! Two-phase formatting pipeline
//!
//! Implements the main formatting flow for one file:
//! - Phase 1: whole-file rules over all lines
//! - Phase 2: region rules over each embedded code block

use crate::config::FormatConfig;
use crate::rules::build_pipeline;
use crate::scanner::{scan, Kind, Region};

/// A correction tagged with the region it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Region kind, or `None` when a whole-file rule reported it.
    pub kind: Option<Kind>,
    /// `Name` attribute of the enclosing element, when known.
    pub name: Option<String>,
    /// Zero-based line index within the region (or file, for whole-file
    /// rules).
    pub line: usize,
    pub message: String,
}

impl ReportEntry {
    /// Bracketed location tag for report lines, e.g. `[declaration:MAIN]`
    /// or `[file]`.
    #[must_use]
    pub fn tag(&self) -> String {
        match (self.kind, &self.name) {
            (Some(kind), Some(name)) => format!("[{}:{name}]", kind.tag()),
            (Some(kind), None) => format!("[{}]", kind.tag()),
            (None, _) => "[file]".to_string(),
        }
    }
}

/// Outcome of formatting one file's content.
#[derive(Debug)]
pub struct FormatReport {
    /// Regions in file order, carrying the rewritten lines.
    pub regions: Vec<Region>,
    /// All corrections, in rule application order.
    pub corrections: Vec<ReportEntry>,
}

impl FormatReport {
    /// Rebuild the full file text from the regions.
    #[must_use]
    pub fn assemble(&self) -> String {
        let mut out = String::new();
        for region in &self.regions {
            for line in &region.lines {
                out.push_str(line);
            }
        }
        out
    }
}

/// Split text into lines, keeping terminators.
///
/// Recognizes `\n`, `\r\n` and bare `\r`, so later terminator edits see the
/// file exactly as stored. The last line has no terminator when the file
/// does not end with one.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                i += 1;
                lines.push(text[start..i].to_string());
                start = i;
            }
            b'\r' => {
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                lines.push(text[start..i].to_string());
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

/// Run the full rule pipeline over file content.
///
/// `lines` must keep their terminators (see [`split_lines`]). Whole-file
/// rules run first, then each code region goes through the region rules in
/// priority order. Rules are built fresh per call, so no state leaks between
/// files.
#[must_use]
pub fn format_lines(mut lines: Vec<String>, config: &FormatConfig) -> FormatReport {
    let mut rules = build_pipeline(config);
    let mut corrections = Vec::new();

    for rule in rules.iter_mut().filter(|rule| rule.whole_file()) {
        rule.format(&mut lines, None);
        corrections.extend(rule.drain_corrections().into_iter().map(|c| ReportEntry {
            kind: None,
            name: None,
            line: c.line,
            message: c.message,
        }));
    }

    let mut regions = scan(&lines);
    for region in &mut regions {
        if region.kind == Kind::Xml {
            continue;
        }
        for rule in rules.iter_mut().filter(|rule| !rule.whole_file()) {
            rule.format(&mut region.lines, Some(region.kind));
            corrections.extend(rule.drain_corrections().into_iter().map(|c| ReportEntry {
                kind: Some(region.kind),
                name: Some(region.name.clone()),
                line: c.line,
                message: c.message,
            }));
        }
    }

    FormatReport { regions, corrections }
}
