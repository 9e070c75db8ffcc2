//! Line terminator normalization.

use regex::Captures;

use crate::config::{FormatConfig, LineEnding};
use crate::rules::{Correction, FormattingRule, ANY_LINE_ENDING_RE};
use crate::scanner::Kind;

const PRIORITY: u32 = 50;

/// Rewrites every line terminator that does not match the configured style.
///
/// Runs on the whole file before region splitting so the XML markup and the
/// embedded code end up with the same terminators. Lines may hold more than
/// one terminator before formatting; each one is corrected on its own.
pub struct EndOfLine {
    target: Option<LineEnding>,
    corrections: Vec<Correction>,
}

impl EndOfLine {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            target: config.end_of_line,
            corrections: Vec::new(),
        }
    }
}

impl FormattingRule for EndOfLine {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn whole_file(&self) -> bool {
        true
    }

    fn format(&mut self, content: &mut [String], _kind: Option<Kind>) {
        let Some(target) = self.target else { return };
        let eol = target.as_str();

        let mut replaced = 0usize;
        for line in content.iter_mut() {
            let mut changed = false;
            let rewritten = ANY_LINE_ENDING_RE.replace_all(line, |caps: &Captures<'_>| {
                if &caps[0] == eol {
                    caps[0].to_string()
                } else {
                    changed = true;
                    replaced += 1;
                    eol.to_string()
                }
            });
            if changed {
                *line = rewritten.into_owned();
            }
        }

        if replaced > 0 {
            self.corrections.push(Correction {
                line: 0,
                message: format!("{replaced} line ending(s) corrected to {}", target.escaped()),
            });
        }
    }

    fn drain_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }
}
