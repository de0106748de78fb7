//! Error types for argcompgen

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for argcompgen operations
pub type Result<T> = std::result::Result<T, CompgenError>;

/// Main error type for argcompgen
#[derive(Error, Debug)]
pub enum CompgenError {
    /// Loading a target program's definition failed
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// The loaded definition violates a structural rule
    #[error("Invalid definition: {0}")]
    Definition(#[from] DefinitionError),

    /// Wrong arguments on the command line (rendered usage message)
    #[error("{0}")]
    Usage(String),

    /// Shell argument outside the supported set
    #[error("shell must be 'bash' or 'zsh' (got '{0}')")]
    InvalidShell(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while obtaining a definition from a target program
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Target not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to start '{path}': {error}")]
    Spawn { path: PathBuf, error: String },

    #[error("Error loading '{path}' (exit code {code:?}): {stderr}")]
    Failed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("'{path}' did not emit its definition within {timeout:?}; killed")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("parser not found: '{0}' exited without emitting its definition")]
    CaptureMissing(PathBuf),

    #[error("Malformed definition captured from '{path}': {error}")]
    Malformed { path: PathBuf, error: String },
}

/// Structural problems in a command definition
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Command name must not be empty")]
    EmptyName,

    #[error("Option in '{0}' declares no spellings")]
    NoSpellings(String),

    #[error("Invalid option spelling '{spelling}' in '{command}'")]
    InvalidSpelling { command: String, spelling: String },

    #[error("Option spelling '{spelling}' is declared more than once in '{command}'")]
    DuplicateSpelling { command: String, spelling: String },

    #[error("Invalid positional name '{name}' in '{command}'")]
    InvalidPositional { command: String, name: String },

    #[error("Invalid subcommand name '{name}' in '{command}'")]
    InvalidSubcommand { command: String, name: String },

    #[error("Subcommand '{name}' is declared more than once in '{command}'")]
    DuplicateSubcommand { command: String, name: String },

    #[error("Exclusive group in '{command}' names unknown option '{spelling}'")]
    UnknownExclusiveMember { command: String, spelling: String },

    #[error("'{0}' declares both positionals and subcommands")]
    PositionalsWithSubcommands(String),
}

/// Specialized result type for load operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Specialized result type for definition validation
pub type DefinitionResult<T> = std::result::Result<T, DefinitionError>;
