//! Variable declaration alignment.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{FormatConfig, IndentStyle};
use crate::rules::{Correction, FormattingRule};
use crate::scanner::{build_re, Kind};

const PRIORITY: u32 = 110;

/// One single-line variable declaration, split into the three columns that
/// get aligned: name, `: <type>;` and an optional trailing comment.
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r"(?x)
        ^\s*
        (\S+)           # variable name
        \s* : \s*
        (.+?) ;         # type, with array bounds, call arguments or default
        \s*
        ([^\r\n]+)?     # trailing comment
        ",
    )
});

/// Terminator of the original line, re-attached after rebuilding.
static TRAILING_EOL_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"[\r\n]+$"));

/// Aligns the columns of variable declarations within one block.
///
/// Only runs on declaration regions. Column widths are computed over all
/// declaration lines of the block, then every declaration is rebuilt with
/// each column starting at a whole indent level. Lines that do not look like
/// a single-line declaration (block keywords, comments, multi-line
/// initializers) pass through untouched.
pub struct VariableAlign {
    enabled: bool,
    use_tabs: bool,
    indent_size: usize,
    actual_indent: usize,
    indent_unit: String,
    corrections: Vec<Correction>,
}

impl VariableAlign {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            enabled: config.align_variables,
            use_tabs: matches!(config.indent_style, Some(IndentStyle::Tab)),
            indent_size: config.indent_size,
            actual_indent: config.actual_indent(),
            indent_unit: config.indent_unit(),
            corrections: Vec::new(),
        }
    }

    /// Pad `line` with indent units until it reaches `level` indent levels.
    ///
    /// The first step is a partial pad up to the next level boundary, the
    /// rest are full units.
    fn pad_to_level(&self, line: &mut String, level: usize) {
        let column = line.chars().count();
        let current = column / self.actual_indent;
        for step in 0..level.saturating_sub(current) {
            if step == 0 {
                if self.use_tabs {
                    line.push('\t');
                } else {
                    line.push_str(&" ".repeat(self.indent_size - column % self.indent_size));
                }
            } else {
                line.push_str(&self.indent_unit);
            }
        }
    }
}

impl FormattingRule for VariableAlign {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn format(&mut self, content: &mut [String], kind: Option<Kind>) {
        if !self.enabled || kind != Some(Kind::Declaration) {
            return;
        }

        let mut column_widths = [0usize; 3];
        let mut declarations: Vec<(usize, [Option<String>; 3])> = Vec::new();
        for (nr, line) in content.iter().enumerate() {
            let Some(caps) = DECLARATION_RE.captures(line) else {
                continue;
            };
            let chunks = [
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| format!(": {};", m.as_str())),
                caps.get(3).map(|m| m.as_str().to_string()),
            ];
            for (width, chunk) in column_widths.iter_mut().zip(&chunks) {
                if let Some(chunk) = chunk {
                    *width = (*width).max(chunk.chars().count());
                }
            }
            declarations.push((nr, chunks));
        }
        if declarations.is_empty() {
            return;
        }

        // Each column starts at the first indent level past the widest entry
        // of the previous column, with at least two cells of clearance
        let mut levels = [1usize; 3];
        for col in 1..3 {
            levels[col] = levels[col - 1] + (column_widths[col - 1] + 2).div_ceil(self.actual_indent);
        }

        for (nr, chunks) in declarations {
            let mut new_line = String::new();
            for (chunk, level) in chunks.iter().zip(levels) {
                let Some(chunk) = chunk else { continue };
                self.pad_to_level(&mut new_line, level);
                new_line.push_str(chunk);
            }
            if let Some(eol) = TRAILING_EOL_RE.find(&content[nr]) {
                new_line.push_str(eol.as_str());
            }
            if content[nr] != new_line {
                self.corrections.push(Correction {
                    line: nr,
                    message: "Variable declaration needs alignment".to_string(),
                });
            }
            content[nr] = new_line;
        }
    }

    fn drain_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }
}
