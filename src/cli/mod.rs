//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, diagnostics and writing the
//! generated script.

pub mod app;
pub mod report;

// Re-export main types
pub use app::*;
pub use report::{Reporter, Verbosity};
