//! argcompgen - shell completion generator
//!
//! Reads the declared structure of a program's command line interface and
//! compiles it into bash or zsh completion scripts. The definition comes
//! from a declaration file or from the program itself, run in a child
//! process that hands its definition back instead of parsing arguments.

// Public modules
pub mod cli;
pub mod definition;
pub mod error;
pub mod generate;
pub mod loader;

// Re-export commonly used types
pub use definition::{CommandDefinition, OptionSpec, Positional};
pub use error::{CompgenError, Result};
pub use generate::Shell;

/// Current version of argcompgen
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
