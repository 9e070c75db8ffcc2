//! File processing and formatting pipeline.
//!
//! This module orchestrates the two-phase formatting of one file:
//!
//! **Phase 1 - Whole file:**
//! - Split the raw text into terminator-keeping lines
//! - Run the whole-file rules (line ending normalization) over all lines
//!
//! **Phase 2 - Regions:**
//! - Scan the lines into XML and code regions
//! - Run the region rules over each declaration/implementation block
//! - XML regions are never handed to rules
//!
//! The main entry point is [`format_lines`], which returns a [`FormatReport`]
//! holding the rewritten regions and all recorded corrections. The caller
//! reassembles the report and compares against the input to decide whether
//! anything has to be written back.

pub mod pipeline;

pub use pipeline::{format_lines, split_lines, FormatReport, ReportEntry};
