//! Conversion from a clap command tree
//!
//! Rust programs declare their CLI with clap; this turns such a declaration
//! into a [`CommandDefinition`] without parsing any arguments.

use crate::definition::types::{CommandDefinition, OptionSpec, Positional};
use clap::{Arg, Command};

impl CommandDefinition {
    /// Build a definition from a clap command.
    ///
    /// Only explicitly declared arguments are converted: the command is not
    /// built, so clap's generated `--help`/`--version` flags and `help`
    /// subcommand are left out. Hidden arguments and subcommands are skipped.
    pub fn from_clap(command: &Command) -> Self {
        convert_command(command)
    }
}

fn convert_command(command: &Command) -> CommandDefinition {
    let mut definition = CommandDefinition::new(command.get_name());
    definition.about = command.get_about().map(|s| s.to_string());

    for arg in command.get_arguments().filter(|a| !a.is_hide_set()) {
        if arg.is_positional() {
            definition.positionals.push(convert_positional(arg));
        } else if let Some(option) = convert_option(arg) {
            definition.options.push(option);
        }
    }

    for group in command.get_groups() {
        let mut group = group.clone();
        if group.is_multiple() {
            continue;
        }
        let spellings: Vec<String> = group
            .get_args()
            .filter_map(|id| command.get_arguments().find(|a| a.get_id() == id))
            .filter(|a| !a.is_positional() && !a.is_hide_set())
            .flat_map(spellings)
            .collect();
        if spellings.len() > 1 {
            definition.exclusive.push(spellings);
        }
    }

    definition.subcommands = command
        .get_subcommands()
        .filter(|s| !s.is_hide_set())
        .map(convert_command)
        .collect();

    definition
}

fn convert_option(arg: &Arg) -> Option<OptionSpec> {
    let flags = spellings(arg);
    if flags.is_empty() {
        return None;
    }

    Some(OptionSpec {
        flags,
        help: arg.get_help().map(|h| h.to_string()),
        takes_value: arg.get_action().takes_values(),
        value_name: arg
            .get_value_names()
            .and_then(|names| names.first())
            .map(|n| n.to_string()),
    })
}

fn convert_positional(arg: &Arg) -> Positional {
    let choices: Vec<String> = arg
        .get_possible_values()
        .iter()
        .filter(|v| !v.is_hide_set())
        .map(|v| v.get_name().to_string())
        .collect();

    Positional {
        name: arg.get_id().as_str().to_string(),
        help: arg.get_help().map(|h| h.to_string()),
        choices: (!choices.is_empty()).then_some(choices),
    }
}

/// Short spellings first, then long ones, each with visible aliases
fn spellings(arg: &Arg) -> Vec<String> {
    let shorts = arg
        .get_short_and_visible_aliases()
        .unwrap_or_default()
        .into_iter()
        .map(|c| format!("-{}", c));
    let longs = arg
        .get_long_and_visible_aliases()
        .unwrap_or_default()
        .into_iter()
        .map(|l| format!("--{}", l));
    shorts.chain(longs).collect()
}
