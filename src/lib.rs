//! tcfmt - Formatter for TwinCAT Structured Text source files
//!
//! TwinCAT stores PLC code as XML documents that carry the actual Structured
//! Text inside CDATA sections. tcfmt rewrites only that embedded code and
//! leaves the surrounding XML byte for byte intact, so formatting never shows
//! up as spurious diffs in the project files.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod process;
pub mod rules;
pub mod scanner;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{FormatConfig, IndentStyle, LineEnding, Properties};
pub use error::Result;
pub use process::{format_lines, split_lines, FormatReport, ReportEntry};
pub use scanner::{scan, Kind, Region};
