//! Formatting rules for embedded Structured Text.
//!
//! Each rule implements [`FormattingRule`]: construction reads the typed
//! [`FormatConfig`], `format` rewrites a block of lines in place, and every
//! change is recorded as a [`Correction`] to be drained afterwards. Rules are
//! assembled per file into a pipeline sorted by ascending priority; rules
//! marked whole-file run once over the entire file before region splitting,
//! all others run on each code region.

mod end_of_line;
mod final_newline;
mod parentheses;
mod tabs;
mod trailing_whitespace;
mod variable_align;

pub use end_of_line::EndOfLine;
pub use final_newline::FinalNewline;
pub use parentheses::ConditionalParentheses;
pub use tabs::TabStyle;
pub use trailing_whitespace::TrailingWhitespace;
pub use variable_align::VariableAlign;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::FormatConfig;
use crate::scanner::{build_re, Kind};

/// Matches one line terminator of any style.
pub(crate) static ANY_LINE_ENDING_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"\r\n|\n|\r"));

/// A single recorded change, for check/dry reporting and debug output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Zero-based line index within the formatted block.
    pub line: usize,
    pub message: String,
}

/// Contract shared by all formatting rules.
///
/// A rule is constructed fresh for every file, so it may keep per-file state
/// between `format` calls on different regions.
pub trait FormattingRule {
    /// Rules run in ascending priority order; ties keep construction order.
    fn priority(&self) -> u32;

    /// Whole-file rules run once on all lines before region splitting.
    fn whole_file(&self) -> bool {
        false
    }

    /// Rewrite `content` in place. `kind` is `None` for whole-file runs.
    fn format(&mut self, content: &mut [String], kind: Option<Kind>);

    /// Hand over the corrections recorded since the last drain.
    fn drain_corrections(&mut self) -> Vec<Correction>;
}

/// Build the rule pipeline for one file.
///
/// Every rule is always constructed; rules whose options are unset simply do
/// nothing when run. The sort is stable, so equal priorities keep the
/// construction order here.
#[must_use]
pub fn build_pipeline(config: &FormatConfig) -> Vec<Box<dyn FormattingRule>> {
    let mut rules: Vec<Box<dyn FormattingRule>> = vec![
        Box::new(TabStyle::new(config)),
        Box::new(TrailingWhitespace::new(config)),
        Box::new(FinalNewline::new(config)),
        Box::new(EndOfLine::new(config)),
        Box::new(VariableAlign::new(config)),
        Box::new(ConditionalParentheses::new(config)),
    ];
    rules.sort_by_key(|rule| rule.priority());
    rules
}
