//! Indentation character conversion between tabs and spaces.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{FormatConfig, IndentStyle};
use crate::rules::{Correction, FormattingRule};
use crate::scanner::{build_re, Kind};

const PRIORITY: u32 = 100;

static TAB_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\t"));

/// Runs of two or more spaces; single spaces between words are not
/// indentation and stay alone.
static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"  +"));

/// Converts indentation whitespace to the configured character.
///
/// Replacements are width-aware: a tab is worth `tab_width` columns, so the
/// visual alignment of a line survives the conversion. Columns are counted in
/// characters from the start of the line.
pub struct TabStyle {
    style: Option<IndentStyle>,
    indent_size: usize,
    tab_width: usize,
    corrections: Vec<Correction>,
}

impl TabStyle {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            style: config.indent_style,
            indent_size: config.indent_size,
            tab_width: config.tab_width,
            corrections: Vec::new(),
        }
    }

    /// Replace each run of spaces with enough tabs to cover its width.
    fn spaces_to_tabs(&self, line: &mut String) -> usize {
        let mut replaced = 0;
        let mut pos = 0;
        while let Some(m) = MULTI_SPACE_RE.find_at(line, pos) {
            let (start, end) = (m.start(), m.end());
            let tabs = "\t".repeat((end - start).div_ceil(self.tab_width));
            pos = start + tabs.len();
            line.replace_range(start..end, &tabs);
            replaced += 1;
        }
        replaced
    }

    /// Replace each tab with spaces up to the next indent stop.
    fn tabs_to_spaces(&self, line: &mut String) -> usize {
        let mut replaced = 0;
        let mut pos = 0;
        while let Some(m) = TAB_RE.find_at(line, pos) {
            let (start, end) = (m.start(), m.end());
            let column = line[..start].chars().count();
            let spaces = " ".repeat(self.indent_size - column % self.indent_size);
            pos = start + spaces.len();
            line.replace_range(start..end, &spaces);
            replaced += 1;
        }
        replaced
    }
}

impl FormattingRule for TabStyle {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn format(&mut self, content: &mut [String], _kind: Option<Kind>) {
        let Some(style) = self.style else { return };
        for (nr, line) in content.iter_mut().enumerate() {
            let replaced = match style {
                IndentStyle::Tab => self.spaces_to_tabs(line),
                IndentStyle::Space => self.tabs_to_spaces(line),
            };
            if replaced > 0 {
                let message = match style {
                    IndentStyle::Tab => "Line contains an indent that should be a tab",
                    IndentStyle::Space => "Line contains a tab that should be spaces",
                };
                self.corrections.push(Correction {
                    line: nr,
                    message: message.to_string(),
                });
            }
        }
    }

    fn drain_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }
}
