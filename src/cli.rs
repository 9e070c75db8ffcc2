//! Command-line interface for tcfmt.
//!
//! Defines CLI arguments using clap builder API
//!
//! Option values are passed through as strings where possible; validation
//! happens once in [`crate::config::FormatConfig::from_properties`] so that
//! config files and CLI overrides go through the same checks.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// Filename patterns picked up from directory targets when no --filter is
/// given.
pub const DEFAULT_FILTERS: &[&str] = &["*.TcPOU", "*.TcGVL", "*.TcDUT"];

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format
    pub targets: Vec<PathBuf>,

    /// Report whether files would change, without writing
    pub check: bool,

    /// Print corrections without writing files
    pub dry: bool,

    /// Recursive directory processing
    pub recursive: bool,

    /// Filename patterns for files picked up from directories
    pub filters: Vec<String>,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Number of spaces per indent level
    pub indent_size: Option<usize>,

    /// Rendered width of a tab character
    pub tab_width: Option<usize>,

    /// Indentation conversion target ("tab" or "space")
    pub indent_style: Option<String>,

    /// Line terminator style ("lf", "cr" or "crlf")
    pub end_of_line: Option<String>,

    /// Strip trailing whitespace from code lines
    pub trim_trailing_whitespace: Option<bool>,

    /// Make every code block end with a newline
    pub insert_final_newline: Option<bool>,

    /// Align variable declarations into columns
    pub align_variables: Option<bool>,

    /// Insert (true) or remove (false) parentheses around conditions
    pub parentheses_conditionals: Option<bool>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (errors only)
    pub silent: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("tcfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Formatter for Structured Text embedded in TwinCAT source XML files")
        .arg(
            Arg::new("targets")
                .help("Files or directories to format")
                .value_name("PATH")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Report whether files would change and exit non-zero if so, without writing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry")
                .long("dry")
                .help("Print the corrections that would be made, without writing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively search directories for project files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .help("Filename pattern for files picked up from directories (can be repeated, replaces the defaults)")
                .value_name("PATTERN")
                .action(ArgAction::Append)
                .default_values(DEFAULT_FILTERS.iter().copied()),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("indent-size")
                .long("indent-size")
                .help("Number of spaces per indent level [default: 4]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("tab-width")
                .long("tab-width")
                .help("Rendered width of a tab character [default: indent size]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("indent-style")
                .long("indent-style")
                .help("Convert indentation to the given style (tab or space)")
                .value_name("STYLE"),
        )
        .arg(
            Arg::new("end-of-line")
                .long("end-of-line")
                .help("Normalize line terminators to the given style (lf, cr or crlf)")
                .value_name("STYLE"),
        )
        .arg(
            Arg::new("trim-trailing-whitespace")
                .long("trim-trailing-whitespace")
                .help("Enable/disable removal of trailing whitespace")
                .value_name("BOOL")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("insert-final-newline")
                .long("insert-final-newline")
                .help("Enable/disable insertion of a final newline in code blocks")
                .value_name("BOOL")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("align-variables")
                .long("align-variables")
                .help("Enable/disable column alignment of variable declarations")
                .value_name("BOOL")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("parentheses-conditionals")
                .long("parentheses-conditionals")
                .help("Insert (true) or remove (false) parentheses around IF/WHILE/CASE conditions")
                .value_name("BOOL")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config resolution and corrections)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (errors only, for editor integration)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        targets: matches
            .get_many::<PathBuf>("targets")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        check: matches.get_flag("check"),
        dry: matches.get_flag("dry"),
        recursive: matches.get_flag("recursive"),
        filters: matches
            .get_many::<String>("filter")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        indent_size: matches.get_one::<usize>("indent-size").copied(),
        tab_width: matches.get_one::<usize>("tab-width").copied(),
        indent_style: matches.get_one::<String>("indent-style").cloned(),
        end_of_line: matches.get_one::<String>("end-of-line").cloned(),
        trim_trailing_whitespace: matches.get_one::<bool>("trim-trailing-whitespace").copied(),
        insert_final_newline: matches.get_one::<bool>("insert-final-newline").copied(),
        align_variables: matches.get_one::<bool>("align-variables").copied(),
        parentheses_conditionals: matches.get_one::<bool>("parentheses-conditionals").copied(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
