//! Command definition model
//!
//! This module holds the tree describing a program's command line
//! interface, the declaration file parser, clap conversion and the
//! structural validation every definition passes before generation.

pub mod from_clap;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
