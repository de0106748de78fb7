//! Declaration file parsing

use crate::definition::types::CommandDefinition;
use crate::error::{CompgenError, LoadError};
use std::fs;
use std::path::Path;

/// File extensions recognised as declaration files
pub const DECLARATION_EXTENSIONS: &[&str] = &["yml", "yaml", "json"];

/// Serialization format of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    Yaml,
    Json,
}

impl DeclarationFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yml" | "yaml" => Some(DeclarationFormat::Yaml),
            "json" => Some(DeclarationFormat::Json),
            _ => None,
        }
    }
}

/// Parse a definition from a string
pub fn parse_definition(
    contents: &str,
    format: DeclarationFormat,
) -> Result<CommandDefinition, CompgenError> {
    let definition = match format {
        DeclarationFormat::Yaml => serde_yaml::from_str(contents)?,
        DeclarationFormat::Json => serde_json::from_str(contents)?,
    };
    Ok(definition)
}

/// Parse a declaration file, naming the root after the file stem when the
/// declaration leaves it unnamed
pub fn parse_definition_file(path: &Path) -> Result<CommandDefinition, CompgenError> {
    let format = DeclarationFormat::from_path(path).ok_or_else(|| LoadError::Malformed {
        path: path.to_path_buf(),
        error: format!(
            "unsupported declaration extension (expected one of: {})",
            DECLARATION_EXTENSIONS.join(", ")
        ),
    })?;

    let contents = fs::read_to_string(path).map_err(|_| LoadError::NotFound(path.to_path_buf()))?;

    let mut definition = parse_definition(&contents, format)?;
    if definition.name.is_empty() {
        definition.name = program_name(path);
    }

    Ok(definition)
}

/// Invocable program name derived from a path: its file stem
/// (`bin/tool.py` becomes `tool`)
pub fn program_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
