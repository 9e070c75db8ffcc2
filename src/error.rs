//! Error types and result aliases for tcfmt.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate

use anyhow::Result as AnyhowResult;

/// Result type used throughout tcfmt
pub type Result<T> = AnyhowResult<T>;
