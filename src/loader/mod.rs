//! Definition loading
//!
//! A target is either a declaration file, read directly, or a program run
//! in a child process that hands its definition back as JSON: executables
//! through the capture protocol, Python scripts through the argparse
//! bootstrap. Either way the definition comes back as a value and is
//! validated before use.

pub mod capture;
pub mod process;
pub mod python;

pub use process::{capture_definition, CAPTURE_ENV, DEFAULT_TIMEOUT};
pub use python::{capture_argparse, is_python_interpreter};

use crate::definition::{
    parse_definition_file, validate_definition, CommandDefinition, DeclarationFormat,
};
use crate::error::{LoadError, Result};
use std::path::Path;
use std::time::Duration;

/// How a target's definition is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionSource {
    Declaration(DeclarationFormat),
    Executable,
    PythonScript,
}

impl DefinitionSource {
    pub fn from_path(path: &Path) -> Self {
        if let Some(format) = DeclarationFormat::from_path(path) {
            return DefinitionSource::Declaration(format);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py") => DefinitionSource::PythonScript,
            _ => DefinitionSource::Executable,
        }
    }
}

/// Loads and validates definitions
#[derive(Debug, Clone)]
pub struct Loader {
    /// Interpreter used to run program targets (e.g. `["python3"]`)
    pub interpreter: Vec<String>,
    /// Longest a target program may run
    pub timeout: Duration,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            interpreter: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set the child timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where the definition of `path` comes from. An explicit interpreter
    /// decides for programs: Python gets the argparse bootstrap, anything
    /// else the capture protocol.
    pub fn source(&self, path: &Path) -> DefinitionSource {
        match (DefinitionSource::from_path(path), self.interpreter.first()) {
            (DefinitionSource::Declaration(format), _) => DefinitionSource::Declaration(format),
            (_, Some(program)) if is_python_interpreter(program) => DefinitionSource::PythonScript,
            (_, Some(_)) => DefinitionSource::Executable,
            (source, None) => source,
        }
    }

    /// Load the root definition of the target at `path`
    pub fn load(&self, path: &Path) -> Result<CommandDefinition> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()).into());
        }

        let definition = match self.source(path) {
            DefinitionSource::Declaration(_) => parse_definition_file(path)?,
            DefinitionSource::Executable => {
                capture_definition(path, &self.interpreter, self.timeout)?
            }
            DefinitionSource::PythonScript => {
                capture_argparse(path, &self.interpreter, self.timeout)?
            }
        };

        validate_definition(&definition)?;
        Ok(definition)
    }
}

/// Load a definition with default settings
pub fn load_definition(path: &Path) -> Result<CommandDefinition> {
    Loader::new().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompgenError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_source_from_path() {
        assert_eq!(
            DefinitionSource::from_path(Path::new("cli.yaml")),
            DefinitionSource::Declaration(DeclarationFormat::Yaml)
        );
        assert_eq!(
            DefinitionSource::from_path(Path::new("cli.py")),
            DefinitionSource::PythonScript
        );
        assert_eq!(
            DefinitionSource::from_path(Path::new("bin/deploy")),
            DefinitionSource::Executable
        );
    }

    #[test]
    fn test_interpreter_decides_source() {
        let python = Loader::new().with_interpreter(vec!["/usr/bin/python3.12".to_string()]);
        assert_eq!(python.source(Path::new("manage")), DefinitionSource::PythonScript);
        assert_eq!(
            python.source(Path::new("cli.json")),
            DefinitionSource::Declaration(DeclarationFormat::Json)
        );

        let shell = Loader::new().with_interpreter(vec!["sh".to_string()]);
        assert_eq!(shell.source(Path::new("cli.py")), DefinitionSource::Executable);
        assert_eq!(Loader::new().timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_load_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_definition(&temp_dir.path().join("nope"));
        assert!(matches!(
            result,
            Err(CompgenError::Load(LoadError::NotFound(_)))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_declaration() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tool.yml");
        fs::write(
            &path,
            "options:\n  - flags: [--x]\n  - flags: [--x]\n    takes_value: true\n",
        )
        .unwrap();

        let result = load_definition(&path);
        assert!(matches!(result, Err(CompgenError::Definition(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_executable_with_interpreter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tool.sh");
        fs::write(
            &path,
            "[ -n \"$ARGCOMPGEN_CAPTURE\" ] && echo '{\"name\":\"tool\",\"subcommands\":[{\"name\":\"run\"}]}'\nexit 0\n",
        )
        .unwrap();

        let def = Loader::new()
            .with_interpreter(vec!["sh".to_string()])
            .load(&path)
            .unwrap();
        assert_eq!(def.subcommands[0].name, "run");
    }

    #[cfg(unix)]
    #[test]
    fn test_load_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wait.sh");
        fs::write(&path, "sleep 30\n").unwrap();

        let result = Loader::new()
            .with_interpreter(vec!["sh".to_string()])
            .with_timeout(Duration::from_millis(200))
            .load(&path);
        assert!(matches!(
            result,
            Err(CompgenError::Load(LoadError::Timeout { .. }))
        ));
    }
}
