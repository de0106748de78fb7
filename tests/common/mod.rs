//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Declaration for a program named `tool` with a `build` subcommand
pub const TOOL_YAML: &str = r#"
name: tool
about: Example tool
options:
  - flags: [--verbose]
    help: Print more
  - flags: [--output]
    help: Output file
    value_name: FILE
subcommands:
  - name: build
    about: Build the project
    positionals:
      - name: target
        choices: [debug, release]
"#;

/// Create a temporary directory containing `file_name` with `content`
pub fn create_test_file(file_name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(file_name);
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// Names of all functions defined in a generated script
pub fn function_names(script: &str) -> Vec<String> {
    script
        .lines()
        .filter_map(|line| line.strip_suffix("() {"))
        .map(str::to_string)
        .collect()
}
