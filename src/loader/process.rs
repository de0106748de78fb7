//! Subprocess capture
//!
//! Runs an executable target in a child process with the capture variable
//! set and reads the definition it writes to stdout.

use crate::definition::{program_name, CommandDefinition};
use crate::error::{LoadError, LoadResult};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Environment variable telling a cooperating program to emit its
/// definition instead of parsing arguments
pub const CAPTURE_ENV: &str = "ARGCOMPGEN_CAPTURE";

/// How long a target may run before it is killed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `path` (through `interpreter` when non-empty) and capture its definition
pub fn capture_definition(
    path: &Path,
    interpreter: &[String],
    timeout: Duration,
) -> LoadResult<CommandDefinition> {
    let command = match interpreter.split_first() {
        Some((program, args)) => {
            let mut command = StdCommand::new(program);
            command.args(args).arg(path);
            command
        }
        None => StdCommand::new(executable_path(path)),
    };

    run_capture(command, path, timeout)
}

/// Run a prepared capture command and decode what it prints
pub(crate) fn run_capture(
    mut command: StdCommand,
    path: &Path,
    timeout: Duration,
) -> LoadResult<CommandDefinition> {
    // No real input: the child must not block on stdin
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.env(CAPTURE_ENV, "1");

    let spawn_error = |e: io::Error| LoadError::Spawn {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut child = command.spawn().map_err(spawn_error)?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_timeout(&mut child, timeout).map_err(spawn_error)? {
        Some(status) => status,
        None => {
            // Readers stay detached: grandchildren may still hold the pipes
            let _ = child.kill();
            let _ = child.wait();
            return Err(LoadError::Timeout {
                path: path.to_path_buf(),
                timeout,
            });
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(LoadError::Failed {
            path: path.to_path_buf(),
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Err(LoadError::CaptureMissing(path.to_path_buf()));
    }

    let mut definition: CommandDefinition =
        serde_json::from_str(stdout).map_err(|e| LoadError::Malformed {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    if definition.name.is_empty() {
        definition.name = program_name(path);
    }

    Ok(definition)
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Wait for `child` up to `timeout`; `None` if it is still running
fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// A bare file name would be looked up on PATH; anchor it to the current
/// directory instead
fn executable_path(path: &Path) -> PathBuf {
    if path.components().count() == 1 && path.is_relative() {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}
