//! Parentheses around conditional expressions.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::FormatConfig;
use crate::rules::{Correction, FormattingRule};
use crate::scanner::{build_re, Kind};

const PRIORITY: u32 = 120;

/// Conditional statement whose condition does not start with `(`.
static BARE_CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r"(?x)
        ^\s*
        (?: IF | WHILE | CASE )
        \s+
        ( [^(\r\n] .+? )    # condition, lazily up to the closing keyword
        \s+
        (?: THEN | DO | OF )
        ",
    )
});

/// Conditional statement with a parenthesized condition.
static WRAPPED_CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r"(?x)
        ^\s*
        (?: IF | WHILE | CASE )
        \s*
        \( ( .+ ) \)        # condition, greedily across nested pairs
        \s*
        (?: THEN | DO | OF )
        ",
    )
});

/// Inserts or removes parentheses around `IF`/`WHILE`/`CASE` conditions.
///
/// Unset means leave conditions as they are; enabled inserts a wrapping pair,
/// disabled removes one.
pub struct ConditionalParentheses {
    insert: Option<bool>,
    corrections: Vec<Correction>,
}

impl ConditionalParentheses {
    #[must_use]
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            insert: config.parentheses_conditionals,
            corrections: Vec::new(),
        }
    }
}

impl FormattingRule for ConditionalParentheses {
    fn priority(&self) -> u32 {
        PRIORITY
    }

    fn format(&mut self, content: &mut [String], _kind: Option<Kind>) {
        let Some(insert) = self.insert else { return };
        for (nr, line) in content.iter_mut().enumerate() {
            let rewritten = if insert {
                wrap_condition(line)
            } else {
                unwrap_condition(line)
            };
            if let Some(new_line) = rewritten {
                *line = new_line;
                let message = if insert {
                    "Parentheses around conditions are expected"
                } else {
                    "Parentheses around condition should be removed"
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

/// Wrap a bare condition, e.g. `IF x > 1 THEN` into `IF (x > 1) THEN`.
fn wrap_condition(line: &str) -> Option<String> {
    let caps = BARE_CONDITION_RE.captures(line)?;
    let condition = caps.get(1)?;
    Some(format!(
        "{}({}){}",
        &line[..condition.start()],
        condition.as_str(),
        &line[condition.end()..]
    ))
}

/// Drop one wrapping pair, e.g. `IF (x > 1) THEN` into `IF x > 1 THEN`.
///
/// The captured text is vetted by walking parenthesis nesting depth: if the
/// depth ever drops below zero, the outer pair is not a real wrapping pair
/// (as in `IF (a) OR (b) THEN`) and the line is left alone. A balanced
/// expression such as `(1+1) = (x-1)` cannot be told apart from a wrapping
/// pair this way and gets rewritten incorrectly; those lines have to be
/// fixed by hand.
fn unwrap_condition(line: &str) -> Option<String> {
    let caps = WRAPPED_CONDITION_RE.captures(line)?;
    let condition = caps.get(1)?;
    if depth_goes_negative(condition.as_str()) {
        return None;
    }

    let mut prefix = line[..condition.start() - 1].to_string();
    let mut suffix = line[condition.end() + 1..].to_string();
    if !prefix.ends_with(' ') {
        prefix.push(' ');
    }
    if !suffix.starts_with(' ') {
        suffix.insert(0, ' ');
    }
    Some(format!("{prefix}{}{suffix}", condition.as_str()))
}

/// True if parenthesis nesting in `text` ever closes more than it opened.
fn depth_goes_negative(text: &str) -> bool {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
