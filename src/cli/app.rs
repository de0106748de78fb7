//! Main CLI application

use crate::cli::report::{Reporter, Verbosity};
use crate::definition::program_name;
use crate::error::CompgenError;
use crate::generate::Shell;
use crate::loader::{Loader, DEFAULT_TIMEOUT};
use anyhow::Context as _;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// One resolved invocation of the tool
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Declaration file or executable to read the definition from
    pub target: PathBuf,
    /// Shell to generate for
    pub shell: Shell,
    /// Program name override
    pub name: Option<String>,
    /// Directory the script is written to
    pub output_dir: PathBuf,
    /// Print the script instead of writing a file
    pub stdout: bool,
    /// Interpreter for program targets
    pub interpreter: Vec<String>,
    /// Longest a target program may run
    pub timeout: Duration,
    pub verbosity: Verbosity,
}

impl Invocation {
    /// Resolve an invocation from parsed arguments
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, CompgenError> {
        let shell = matches
            .get_one::<String>("shell")
            .map(String::as_str)
            .unwrap_or_default()
            .parse::<Shell>()?;

        Ok(Invocation {
            target: matches
                .get_one::<PathBuf>("target")
                .cloned()
                .unwrap_or_default(),
            shell,
            name: matches.get_one::<String>("name").cloned(),
            output_dir: matches
                .get_one::<PathBuf>("output-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
            stdout: matches.get_flag("stdout"),
            interpreter: matches
                .get_many::<String>("interpreter")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            timeout: matches
                .get_one::<u64>("timeout")
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or(DEFAULT_TIMEOUT),
            verbosity: get_verbosity(matches),
        })
    }

    /// Program name used for function names, registration and output file
    pub fn prog_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| program_name(&self.target))
    }

    /// Load, generate and emit the completion script
    pub fn execute(&self) -> anyhow::Result<()> {
        let reporter = Reporter::new(self.verbosity);
        let prog = self.prog_name();

        let loader = Loader::new()
            .with_interpreter(self.interpreter.clone())
            .with_timeout(self.timeout);
        reporter.debug(&format!(
            "Loading {} ({:?})",
            self.target.display(),
            loader.source(&self.target)
        ));

        let mut definition = loader.load(&self.target)?;
        if definition.name != prog {
            reporter.warn(&format!(
                "Definition is named '{}'; generating for '{}'",
                definition.name, prog
            ));
            definition.name = prog.clone();
        }

        reporter.debug(&format!(
            "Captured '{}': {} option(s), {} level(s)",
            definition.name,
            definition.options.len(),
            definition.depth_count()
        ));

        let script = self.shell.generate(&definition, &prog);

        if self.stdout {
            print!("{}", script);
            return Ok(());
        }

        let path = self.output_dir.join(self.shell.file_name(&prog));
        fs::write(&path, &script)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        reporter.info(&format!(
            "Wrote {} completion to {}",
            self.shell,
            path.display()
        ));

        Ok(())
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("argcompgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate bash and zsh completion scripts from a program's declared CLI")
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Declaration file (.yml, .yaml, .json) or executable to capture")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("shell")
                .value_name("SHELL")
                .help("Shell to generate for: bash or zsh")
                .required(true),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("Program name (defaults to the target's file stem)"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory to write the script to"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Print the script instead of writing a file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interpreter")
                .short('i')
                .long("interpreter")
                .value_name("WORD")
                .help("Interpreter word for program targets (repeat: -i python3 -i -X -i dev)")
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64).range(1..))
                .help("Kill a target program that runs longer than this (default: 10)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no diagnostics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run with the process arguments
pub fn run() -> anyhow::Result<()> {
    run_from(std::env::args_os())
}

/// Run with explicit arguments (first item is the binary name)
pub fn run_from<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            e.print()?;
            return Ok(());
        }
        Err(e) => return Err(CompgenError::Usage(e.render().to_string()).into()),
    };

    Invocation::from_matches(&matches)?.execute()
}
