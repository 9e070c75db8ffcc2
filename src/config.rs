//! Configuration management for tcfmt.
//!
//! Formatting options form a flat profile of editorconfig-style keys, built
//! per target file from three sources (later ones override earlier ones key
//! by key):
//! - TOML files (`tcfmt.toml`), auto-discovered by searching the user's home
//!   directory plus the parent directories of the file being formatted, from
//!   the filesystem root down
//! - an explicit `--config` file, which replaces auto-discovery entirely
//! - CLI arguments
//!
//! The resolved profile is converted once into the typed [`FormatConfig`]
//! the formatting rules consume. All option validation happens in that
//! conversion, before any file is touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["tcfmt.toml"];

/// Spellings accepted as `true` in string-typed options; everything else is
/// false.
const TRUTHY_VALUES: &[&str] = &["TRUE", "True", "true", "1"];

/// Default width of one indent level, in spaces.
const DEFAULT_INDENT_SIZE: usize = 4;

/// Resolved flat profile of formatting options, keyed by option name.
pub type Properties = BTreeMap<String, String>;

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    // Try HOME environment variable first (works on Unix and some Windows setups)
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

/// Option subset read from one TOML file
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging profiles.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialProperties {
    pub indent_size: Option<i64>,
    pub tab_width: Option<i64>,
    pub indent_style: Option<String>,
    pub end_of_line: Option<String>,
    pub trim_trailing_whitespace: Option<bool>,
    pub insert_final_newline: Option<bool>,
    pub twincat_align_variables: Option<bool>,
    pub twincat_parentheses_conditionals: Option<bool>,
}

impl PartialProperties {
    /// Fold into a flat profile, only overriding keys that are explicitly set
    fn apply_to(&self, props: &mut Properties) {
        if let Some(v) = self.indent_size {
            props.insert("indent_size".to_string(), v.to_string());
        }
        if let Some(v) = self.tab_width {
            props.insert("tab_width".to_string(), v.to_string());
        }
        if let Some(v) = &self.indent_style {
            props.insert("indent_style".to_string(), v.clone());
        }
        if let Some(v) = &self.end_of_line {
            props.insert("end_of_line".to_string(), v.clone());
        }
        if let Some(v) = self.trim_trailing_whitespace {
            props.insert("trim_trailing_whitespace".to_string(), v.to_string());
        }
        if let Some(v) = self.insert_final_newline {
            props.insert("insert_final_newline".to_string(), v.to_string());
        }
        if let Some(v) = self.twincat_align_variables {
            props.insert("twincat_align_variables".to_string(), v.to_string());
        }
        if let Some(v) = self.twincat_parentheses_conditionals {
            props.insert("twincat_parentheses_conditionals".to_string(), v.to_string());
        }
    }
}

/// Discover config files for a target path
///
/// Searches the home directory first, then the target's parent directories
/// from the filesystem root down. Returns paths in merge order (least
/// specific first), so files closer to the target override when applied in
/// sequence.
#[must_use]
pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
    let mut config_files = Vec::new();

    // Add home directory config first (lowest priority)
    if let Some(home) = dirs_home() {
        for config_name in CONFIG_FILE_NAMES {
            let home_config = home.join(config_name);
            if home_config.is_file() {
                config_files.push(home_config);
            }
        }
    }

    // Start from the file's parent directory (or the path itself if it's a directory)
    let start_dir = if start_path.is_file() {
        start_path.parent().map(Path::to_path_buf)
    } else if start_path.is_dir() {
        Some(start_path.to_path_buf())
    } else {
        // Path doesn't exist, use current directory
        std::env::current_dir().ok()
    };

    // Collect config files from parent directories (from root to current)
    if let Some(dir) = start_dir {
        let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
        // Reverse so we go from root to current (less specific to more specific)
        ancestors.reverse();

        for ancestor in ancestors {
            for config_name in CONFIG_FILE_NAMES {
                let config_path = ancestor.join(config_name);
                if config_path.is_file() && !config_files.contains(&config_path) {
                    config_files.push(config_path);
                }
            }
        }
    }

    config_files
}

/// Build the flat profile for one target from discovered config files
///
/// Later files override earlier ones (only explicitly set keys). Unreadable
/// or unparsable discovered files produce a warning and are skipped. Returns
/// an empty profile when no files are found.
#[must_use]
pub fn properties_from_discovered_files(start_path: &Path) -> Properties {
    let mut props = Properties::new();
    for path in discover_config_files(start_path) {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<PartialProperties>(&contents) {
                Ok(partial) => partial.apply_to(&mut props),
                Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
            },
            Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
        }
    }
    props
}

/// Build the flat profile from one explicit config file
///
/// Unlike discovery, a file named on the command line must load; errors are
/// fatal.
pub fn properties_from_file(path: &Path) -> Result<Properties> {
    let contents = std::fs::read_to_string(path)?;
    let partial: PartialProperties = toml::from_str(&contents)?;
    let mut props = Properties::new();
    partial.apply_to(&mut props);
    Ok(props)
}

/// Indentation character choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

/// Line terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Cr,
    CrLf,
}

impl LineEnding {
    /// The terminator bytes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Escaped rendering for report messages.
    #[must_use]
    pub fn escaped(self) -> &'static str {
        match self {
            LineEnding::Lf => "\\n",
            LineEnding::Cr => "\\r",
            LineEnding::CrLf => "\\r\\n",
        }
    }
}

/// Typed formatting options, converted from a flat profile once per file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Width of one indent level, in spaces (default: 4)
    pub indent_size: usize,

    /// Rendered width of a tab character (default: indent size)
    pub tab_width: usize,

    /// Indentation character conversion; `None` leaves indentation alone
    pub indent_style: Option<IndentStyle>,

    /// Line terminator normalization; `None` leaves terminators alone
    pub end_of_line: Option<LineEnding>,

    /// Strip trailing whitespace from code lines (default: false)
    pub trim_trailing_whitespace: bool,

    /// Make every code block end with a newline (default: false)
    pub insert_final_newline: bool,

    /// Align variable declarations into columns (default: false)
    pub align_variables: bool,

    /// `Some(true)` inserts parentheses around conditions, `Some(false)`
    /// removes them, `None` leaves them alone
    pub parentheses_conditionals: Option<bool>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            indent_size: DEFAULT_INDENT_SIZE,
            tab_width: DEFAULT_INDENT_SIZE,
            indent_style: None,
            end_of_line: None,
            trim_trailing_whitespace: false,
            insert_final_newline: false,
            align_variables: false,
            parentheses_conditionals: None,
        }
    }
}

impl FormatConfig {
    /// Convert a resolved profile into typed options
    ///
    /// An unknown `end_of_line` value is a hard error: silently defaulting
    /// would rewrite every terminator in the file to a style the user never
    /// asked for. Any other absent, malformed or out-of-range value falls
    /// back to its default.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let indent_size = parse_width(props.get("indent_size")).unwrap_or(DEFAULT_INDENT_SIZE);
        let tab_width = parse_width(props.get("tab_width")).unwrap_or(indent_size);

        let indent_style = props.get("indent_style").and_then(|v| match v.as_str() {
            "tab" => Some(IndentStyle::Tab),
            "space" => Some(IndentStyle::Space),
            _ => None,
        });

        let end_of_line = match props.get("end_of_line").map(String::as_str) {
            None => None,
            Some("lf") => Some(LineEnding::Lf),
            Some("cr") => Some(LineEnding::Cr),
            Some("crlf") => Some(LineEnding::CrLf),
            Some(other) => {
                anyhow::bail!("unknown end_of_line style `{other}` (expected lf, cr or crlf)")
            }
        };

        Ok(FormatConfig {
            indent_size,
            tab_width,
            indent_style,
            end_of_line,
            trim_trailing_whitespace: truthy(props.get("trim_trailing_whitespace")),
            insert_final_newline: truthy(props.get("insert_final_newline")),
            align_variables: truthy(props.get("twincat_align_variables")),
            parentheses_conditionals: props
                .get("twincat_parentheses_conditionals")
                .map(|v| is_truthy(v)),
        })
    }

    /// Terminator to fall back to when none is configured or detectable.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        self.end_of_line.map_or("\n", LineEnding::as_str)
    }

    /// Indent granularity in characters: the rendered tab width when
    /// indenting with tabs, the indent size otherwise.
    #[must_use]
    pub fn actual_indent(&self) -> usize {
        match self.indent_style {
            Some(IndentStyle::Tab) => self.tab_width,
            _ => self.indent_size,
        }
    }

    /// One full indent unit as text.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        match self.indent_style {
            Some(IndentStyle::Tab) => "\t".to_string(),
            _ => " ".repeat(self.indent_size),
        }
    }
}

/// Parse a positive width option; `None` for absent, malformed or zero
/// values.
fn parse_width(value: Option<&String>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
}

/// String-typed boolean with a fixed set of true spellings.
fn is_truthy(value: &str) -> bool {
    TRUTHY_VALUES.contains(&value)
}

fn truthy(value: Option<&String>) -> bool {
    value.is_some_and(|v| is_truthy(v))
}
