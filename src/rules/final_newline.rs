//! Final newline insertion.

use crate::config::FormatConfig;
use crate::rules::{Correction, FormattingRule, ANY_LINE_ENDING_RE};
use crate::scanner::Kind;

const PRIORITY: u32 = 100;

/// Makes sure each code block ends with a line terminator.
///
/// The terminator style is taken from the block's first line, falling back to
/// the configured end-of-line style (or `\n`) for blocks that have no
/// terminator anywhere. Empty blocks are left alone.
pub struct FinalNewline {
    enabled: bool,
    fallback: &'static str,
    corrections: Vec<Correction>,
}

impl FinalNewline {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            enabled: config.insert_final_newline,
            fallback: config.line_ending(),
            corrections: Vec::new(),
        }
    }
}

impl FormattingRule for FinalNewline {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn format(&mut self, content: &mut [String], _kind: Option<Kind>) {
        if !self.enabled || content.is_empty() {
            return;
        }
        if content.len() == 1 && content[0].is_empty() {
            return;
        }

        // Walk back over empty tail lines to find the line that decides
        // whether the block is terminated
        let mut idx = content.len() - 1;
        loop {
            let line = &content[idx];
            if line.ends_with('\n') || line.ends_with('\r') {
                return;
            }
            if !line.is_empty() || idx == 0 {
                break;
            }
            idx -= 1;
        }

        let eol = ANY_LINE_ENDING_RE
            .find(&content[0])
            .map_or(self.fallback, |m| m.as_str())
            .to_string();
        let last = content.len() - 1;
        content[last].push_str(&eol);
        self.corrections.push(Correction {
            line: last,
            message: "Block does not end with a newline".to_string(),
        });
    }

    fn drain_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }
}
