//! Capture hooks for target programs
//!
//! A program opts into subprocess capture by calling [`intercept`] right
//! before it starts parsing its arguments:
//!
//! ```no_run
//! use clap::{Arg, ArgAction, Command};
//!
//! let cmd = Command::new("tool").arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue));
//! argcompgen::loader::capture::intercept(&cmd);
//! let _matches = cmd.get_matches();
//! ```

use crate::definition::CommandDefinition;
use crate::loader::process::CAPTURE_ENV;
use std::io::{self, Write};
use std::process;

/// Whether the current process was started to have its definition captured
pub fn capture_requested() -> bool {
    std::env::var_os(CAPTURE_ENV).is_some_and(|v| v == "1")
}

/// Write `definition` in the capture format
pub fn emit<W: Write>(definition: &CommandDefinition, mut out: W) -> io::Result<()> {
    serde_json::to_writer(&mut out, definition)?;
    writeln!(out)?;
    out.flush()
}

/// Emit the definition of `command` and exit when capture was requested;
/// return otherwise so normal parsing can proceed
pub fn intercept(command: &clap::Command) {
    intercept_definition(&CommandDefinition::from_clap(command));
}

/// [`intercept`] for programs that build a [`CommandDefinition`] directly
pub fn intercept_definition(definition: &CommandDefinition) {
    if !capture_requested() {
        return;
    }
    let code = match emit(definition, io::stdout().lock()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: failed to emit definition: {}", e);
            1
        }
    };
    process::exit(code);
}
