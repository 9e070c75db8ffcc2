//! Trailing whitespace removal.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::FormatConfig;
use crate::rules::{Correction, FormattingRule};
use crate::scanner::{build_re, Kind};

const PRIORITY: u32 = 90;

/// Horizontal whitespace before the line terminator (or before the end of an
/// unterminated line). The terminator is captured so it can be re-attached
/// byte for byte.
static TRAILING_WS_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"[^\S\r\n]+([\r\n]*)$"));

/// Strips spaces and tabs from the end of each line.
pub struct TrailingWhitespace {
    enabled: bool,
    corrections: Vec<Correction>,
}

impl TrailingWhitespace {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            enabled: config.trim_trailing_whitespace,
            corrections: Vec::new(),
        }
    }
}

impl FormattingRule for TrailingWhitespace {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn format(&mut self, content: &mut [String], _kind: Option<Kind>) {
        if !self.enabled {
            return;
        }
        for (nr, line) in content.iter_mut().enumerate() {
            let Some(caps) = TRAILING_WS_RE.captures(line) else {
                continue;
            };
            let Some(whole) = caps.get(0) else { continue };
            let terminator = caps.get(1).map_or("", |m| m.as_str());
            let trimmed = format!("{}{terminator}", &line[..whole.start()]);
            *line = trimmed;
            self.corrections.push(Correction {
                line: nr,
                message: "Line contains trailing whitespace".to_string(),
            });
        }
    }

    fn drain_corrections(&mut self) -> Vec<Correction> {
        std::mem::take(&mut self.corrections)
    }
}
