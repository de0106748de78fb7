//! Python argparse capture
//!
//! Unmodified Python programs know nothing about the capture variable. They
//! are run under a small bootstrap instead, which stops the script at its
//! first `parse_args()` call and prints the parser as the same JSON the
//! capture protocol uses.

use crate::definition::CommandDefinition;
use crate::error::LoadResult;
use crate::loader::process::run_capture;
use std::path::Path;
use std::process::Command as StdCommand;
use std::time::Duration;

/// Bootstrap passed to the interpreter with `-c`
pub const BOOTSTRAP: &str = include_str!("argparse_capture.py");

/// Interpreter used when a `.py` target is given without one
pub const DEFAULT_PYTHON: &str = "python3";

/// Whether `program` names a Python interpreter (`python`, `python3.12`,
/// `/usr/bin/python3`, ...)
pub fn is_python_interpreter(program: &str) -> bool {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("python"))
}

/// `<interpreter> -c <bootstrap> <path>`
fn python_command(path: &Path, interpreter: &[String]) -> StdCommand {
    let mut command = match interpreter.split_first() {
        Some((program, args)) => {
            let mut command = StdCommand::new(program);
            command.args(args);
            command
        }
        None => StdCommand::new(DEFAULT_PYTHON),
    };
    command.arg("-c").arg(BOOTSTRAP).arg(path);
    command
}

/// Capture the argparse parser of the Python script at `path`
pub fn capture_argparse(
    path: &Path,
    interpreter: &[String],
    timeout: Duration,
) -> LoadResult<CommandDefinition> {
    run_capture(python_command(path, interpreter), path, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use std::ffi::OsStr;
    use std::fs;
    use std::process::Stdio;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(30);

    const CLI_PY: &str = r#"import argparse
import os

print("banner printed at import")


def main():
    parser = argparse.ArgumentParser(description="Deploy things")
    parser.add_argument("--verbose", action="store_true", help="Print more")
    parser.add_argument("-o", "--output", metavar="FILE", help="Output file")
    parser.add_argument("--secret", help=argparse.SUPPRESS)
    fmt = parser.add_mutually_exclusive_group()
    fmt.add_argument("--json", action="store_true")
    fmt.add_argument("--yaml", action="store_true")
    subparsers = parser.add_subparsers(dest="command")
    build = subparsers.add_parser("build", help="Compile the project")
    build.add_argument("target", choices=["debug", "release"])
    build.add_argument("--jobs", type=int, default=4, help="Workers (default: %(default)s)")
    subparsers.add_parser("clean")
    args = parser.parse_args()
    with open(os.path.join(os.path.dirname(__file__), "ran.txt"), "w") as f:
        f.write(str(args))


if __name__ == "__main__":
    main()
"#;

    fn python_available() -> bool {
        StdCommand::new(DEFAULT_PYTHON)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn write_script(name: &str, content: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(name);
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_is_python_interpreter() {
        assert!(is_python_interpreter("python"));
        assert!(is_python_interpreter("python3.12"));
        assert!(is_python_interpreter("/usr/bin/python3"));
        assert!(!is_python_interpreter("sh"));
        assert!(!is_python_interpreter("/opt/python/bin/pypy3"));
    }

    #[test]
    fn test_python_command_line() {
        let command = python_command(Path::new("cli.py"), &[]);
        assert_eq!(command.get_program(), OsStr::new("python3"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec![OsStr::new("-c"), OsStr::new(BOOTSTRAP), OsStr::new("cli.py")]);

        let interpreter = vec!["python3.11".to_string(), "-X".to_string(), "dev".to_string()];
        let command = python_command(Path::new("cli.py"), &interpreter);
        assert_eq!(command.get_program(), OsStr::new("python3.11"));
        assert_eq!(command.get_args().next(), Some(OsStr::new("-X")));
    }

    #[test]
    fn test_capture_argparse_script() {
        if !python_available() {
            return;
        }
        let (temp_dir, path) = write_script("cli.py", CLI_PY);

        let def = capture_argparse(&path, &[], TIMEOUT).unwrap();
        assert!(!temp_dir.path().join("ran.txt").exists());

        assert_eq!(def.name, "cli");
        assert_eq!(def.about.as_deref(), Some("Deploy things"));
        assert_eq!(
            def.flag_options().collect::<Vec<_>>(),
            vec!["-h", "--help", "--verbose", "--json", "--yaml"]
        );
        assert_eq!(def.value_options().collect::<Vec<_>>(), vec!["-o", "--output"]);
        assert!(def.find_option("--secret").is_none());
        assert_eq!(def.find_option("--output").unwrap().value_label(), "FILE");
        assert_eq!(def.exclusive, vec![vec!["--json", "--yaml"]]);

        let names: Vec<_> = def.subcommands.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["build", "clean"]);
        let build = &def.subcommands[0];
        assert_eq!(build.about.as_deref(), Some("Compile the project"));
        assert_eq!(build.positionals[0].name, "target");
        assert_eq!(
            build.positionals[0].choices,
            Some(vec!["debug".to_string(), "release".to_string()])
        );
        let jobs = build.find_option("--jobs").unwrap();
        assert!(jobs.takes_value());
        assert_eq!(jobs.help.as_deref(), Some("Workers (default: 4)"));
    }

    #[test]
    fn test_script_that_never_parses_is_capture_missing() {
        if !python_available() {
            return;
        }
        let (_temp_dir, path) = write_script("plain.py", "print('hello')\n");

        let result = capture_argparse(&path, &[], TIMEOUT);
        assert!(matches!(result, Err(LoadError::CaptureMissing(_))));
    }

    #[test]
    fn test_script_error_is_load_failure() {
        if !python_available() {
            return;
        }
        let (_temp_dir, path) = write_script("broken.py", "raise RuntimeError('no config')\n");

        match capture_argparse(&path, &[], TIMEOUT) {
            Err(LoadError::Failed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("RuntimeError: no config"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
