//! Command definition types
//!
//! This module defines the in-memory tree describing one program's CLI:
//! its options, positionals, mutually exclusive groups and subcommands.

use serde::{Deserialize, Serialize};

/// One level of a command line interface (the program itself or a subcommand)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandDefinition {
    /// Invocable name (program name at the root, subcommand name below it)
    #[serde(default)]
    pub name: String,

    /// Short help text (used when listing subcommands)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,

    /// Named options in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,

    /// Positional arguments in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<Positional>,

    /// Mutually exclusive groups, each listing option spellings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusive: Vec<Vec<String>>,

    /// Nested subcommands in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDefinition>,
}

/// A named option, e.g. `-o/--output FILE` or `--verbose`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionSpec {
    /// All spellings of the option, e.g. `["-o", "--output"]`
    pub flags: Vec<String>,

    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Whether the option consumes a following value
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub takes_value: bool,

    /// Placeholder name for the value (implies `takes_value`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

/// A positional argument
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Positional {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Closed set of allowed values, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl CommandDefinition {
    /// Create an empty definition with the given name
    pub fn new(name: impl Into<String>) -> Self {
        CommandDefinition {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the help text
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Add an option
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add a positional argument
    pub fn positional(mut self, positional: Positional) -> Self {
        self.positionals.push(positional);
        self
    }

    /// Add a mutually exclusive group
    pub fn exclusive<I, S>(mut self, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive
            .push(spellings.into_iter().map(Into::into).collect());
        self
    }

    /// Add a nested subcommand
    pub fn subcommand(mut self, subcommand: CommandDefinition) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Spellings of options that take no value, in declaration order
    pub fn flag_options(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|o| !o.takes_value())
            .flat_map(|o| o.flags.iter().map(String::as_str))
    }

    /// Spellings of options that consume a value, in declaration order
    pub fn value_options(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|o| o.takes_value())
            .flat_map(|o| o.flags.iter().map(String::as_str))
    }

    /// Find the option declaring `spelling`
    pub fn find_option(&self, spelling: &str) -> Option<&OptionSpec> {
        self.options
            .iter()
            .find(|o| o.flags.iter().any(|f| f == spelling))
    }

    /// Resolve each exclusive group to the options it covers.
    ///
    /// Members are returned in option declaration order, so the output is
    /// stable regardless of how the group lists them.
    pub fn exclusive_groups(&self) -> Vec<Vec<&OptionSpec>> {
        self.exclusive
            .iter()
            .map(|group| {
                self.options
                    .iter()
                    .filter(|o| o.flags.iter().any(|f| group.contains(f)))
                    .collect::<Vec<_>>()
            })
            .filter(|members| !members.is_empty())
            .collect()
    }

    /// Whether this level dispatches to subcommands
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Total number of levels in this tree (this level included)
    pub fn depth_count(&self) -> usize {
        1 + self
            .subcommands
            .iter()
            .map(CommandDefinition::depth_count)
            .sum::<usize>()
    }
}

impl OptionSpec {
    /// A boolean option
    pub fn flag<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionSpec {
            flags: flags.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// An option consuming a value
    pub fn value<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionSpec {
            takes_value: true,
            ..Self::flag(flags)
        }
    }

    /// Set the help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the value placeholder
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    pub fn takes_value(&self) -> bool {
        self.takes_value || self.value_name.is_some()
    }

    /// Name used to describe the option's value: the placeholder if set,
    /// otherwise the longest spelling without leading dashes
    pub fn value_label(&self) -> String {
        if let Some(name) = &self.value_name {
            return name.clone();
        }
        self.flags
            .iter()
            .max_by_key(|f| f.len())
            .map(|f| f.trim_start_matches('-').replace('-', "_"))
            .unwrap_or_default()
    }
}

impl Positional {
    pub fn new(name: impl Into<String>) -> Self {
        Positional {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}
